//! Author profiles.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use blogicum_core::error::DomainError;
use blogicum_core::forms::{FormErrors, ProfileForm};
use blogicum_core::ports::BaseRepository;
use blogicum_shared::Notice;
use blogicum_shared::dto::PageQuery;

use super::auth::user_response;
use super::page::{profile_url, redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let (owner, page) = state
        .blog
        .profile(&path.into_inner(), viewer, query.page.as_deref())
        .await?;

    render(
        &state,
        &req,
        viewer,
        "blog/profile.html",
        json!({ "profile": user_response(&owner), "page_obj": page }),
    )
}

/// GET /profile/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", identity.user_id)))?;

    let form = ProfileForm {
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    };

    render(
        &state,
        &req,
        identity.viewer(),
        "blog/user.html",
        json!({ "form": form, "errors": FormErrors::default() }),
    )
}

/// POST /profile/edit/
pub async fn edit(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    match state.blog.edit_profile(identity.user_id, &form).await {
        Ok(user) => Ok(redirect(&profile_url(&user.username), Some(Notice::success("Profile updated.")))),
        Err(DomainError::InvalidForm(errors)) => render(
            &state,
            &req,
            identity.viewer(),
            "blog/user.html",
            json!({ "form": form, "errors": errors }),
        ),
        Err(e) => Err(e.into()),
    }
}
