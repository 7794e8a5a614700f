//! Comments on a post.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use blogicum_core::error::DomainError;
use blogicum_core::forms::CommentForm;
use blogicum_core::policy::Outcome;
use blogicum_shared::Notice;

use super::page::{post_url, redirect, render};
use super::posts::detail_page;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /posts/{id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();

    match state.blog.add_comment(identity.user_id, post_id, &form).await {
        Ok(_) => Ok(redirect(&post_url(post_id), None)),
        Err(DomainError::InvalidForm(errors)) => {
            let viewer = identity.viewer();
            let detail = state.blog.post_detail(post_id, viewer).await?;
            detail_page(&state, &req, viewer, detail, &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let form = form.into_inner();

    match state
        .blog
        .edit_comment(identity.viewer(), post_id, comment_id, &form)
        .await
    {
        Ok(Outcome::Done(_)) => Ok(redirect(&post_url(post_id), None)),
        Ok(Outcome::Denied) => Ok(redirect(
            &post_url(post_id),
            Some(Notice::error("You can only change your own comments.")),
        )),
        Err(DomainError::InvalidForm(errors)) => render(
            &state,
            &req,
            identity.viewer(),
            "blog/comment.html",
            json!({
                "form": form,
                "errors": errors,
                "post_id": post_id,
                "comment_id": comment_id,
            }),
        ),
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{id}/delete_comment/{comment_id}/
///
/// Someone else's comment is reported as missing.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    state
        .blog
        .delete_comment(identity.user_id, post_id, comment_id)
        .await?;

    Ok(redirect(&post_url(post_id), Some(Notice::success("Comment deleted."))))
}
