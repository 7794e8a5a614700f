//! Post pages: listing, detail, create, edit, delete.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use blogicum_core::domain::Viewer;
use blogicum_core::error::DomainError;
use blogicum_core::forms::{CommentForm, FormErrors, PostForm};
use blogicum_core::policy::{Outcome, Publication};
use blogicum_core::ports::BaseRepository;
use blogicum_core::services::{PostDetail, SavedPost};
use blogicum_shared::Notice;
use blogicum_shared::dto::PageQuery;

use super::page::{post_url, profile_url, redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const NOT_YOUR_POST: &str = "You can only change your own posts.";

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.index(query.page.as_deref()).await?;

    render(&state, &req, identity.viewer(), "blog/index.html", json!({ "page_obj": page }))
}

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let detail = state.blog.post_detail(path.into_inner(), viewer).await?;

    detail_page(&state, &req, viewer, detail, &CommentForm::default(), &FormErrors::default())
}

/// Detail page. The comment form is offered to signed-in viewers only.
pub(super) fn detail_page(
    state: &AppState,
    req: &HttpRequest,
    viewer: Viewer,
    detail: PostDetail,
    form: &CommentForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let form = viewer.is_authenticated().then_some(form);

    render(
        state,
        req,
        viewer,
        "blog/detail.html",
        json!({
            "post": detail.post,
            "comments": detail.comments,
            "form": form,
            "errors": errors,
        }),
    )
}

async fn post_form_page(
    state: &AppState,
    req: &HttpRequest,
    viewer: Viewer,
    form: &PostForm,
    errors: &FormErrors,
    post_id: Option<Uuid>,
) -> AppResult<HttpResponse> {
    let (categories, locations) = state.blog.published_choices().await?;

    render(
        state,
        req,
        viewer,
        "blog/create.html",
        json!({
            "form": form,
            "errors": errors,
            "categories": categories,
            "locations": locations,
            "post_id": post_id,
        }),
    )
}

/// Username to send the author back to. Tokens keep the name they were
/// issued with, so prefer the stored one.
async fn current_username(state: &AppState, identity: &Identity) -> AppResult<String> {
    let user = state.users.find_by_id(identity.user_id).await?;
    Ok(user.map_or_else(|| identity.username.clone(), |u| u.username))
}

fn saved_notice(saved: &SavedPost, created: bool) -> Notice {
    let action = if created { "created" } else { "updated" };
    match saved.publication {
        Publication::Published if created => Notice::success("Post published successfully!"),
        Publication::Published => Notice::success("Post updated."),
        Publication::Scheduled => Notice::success(format!(
            "Post {action} and will be published on {}",
            saved.post.pub_date.format("%d.%m.%Y at %H:%M")
        )),
        Publication::Draft => Notice::info(format!("Post {action} as a draft.")),
    }
}

fn denied(post_id: Uuid) -> HttpResponse {
    redirect(&post_url(post_id), Some(Notice::error(NOT_YOUR_POST)))
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let form = state.blog.blank_post_form();

    post_form_page(&state, &req, identity.viewer(), &form, &FormErrors::default(), None).await
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    match state.blog.create_post(identity.user_id, &form).await {
        Ok(saved) => {
            let username = current_username(&state, &identity).await?;
            Ok(redirect(&profile_url(&username), Some(saved_notice(&saved, true))))
        }
        Err(DomainError::InvalidForm(errors)) => {
            post_form_page(&state, &req, identity.viewer(), &form, &errors, None).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    match state.blog.edit_form(identity.viewer(), id).await? {
        Outcome::Done(form) => {
            post_form_page(&state, &req, identity.viewer(), &form, &FormErrors::default(), Some(id)).await
        }
        Outcome::Denied => Ok(denied(id)),
    }
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    match state.blog.edit_post(identity.viewer(), id, &form).await {
        Ok(Outcome::Done(saved)) => Ok(redirect(&post_url(id), Some(saved_notice(&saved, false)))),
        Ok(Outcome::Denied) => Ok(denied(id)),
        Err(DomainError::InvalidForm(errors)) => {
            post_form_page(&state, &req, identity.viewer(), &form, &errors, Some(id)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    match state.blog.delete_post(identity.viewer(), id).await? {
        Outcome::Done(_) => {
            let username = current_username(&state, &identity).await?;
            Ok(redirect(&profile_url(&username), Some(Notice::success("Post deleted."))))
        }
        Outcome::Denied => Ok(denied(id)),
    }
}
