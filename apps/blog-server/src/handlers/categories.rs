//! Category listing.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use blogicum_shared::dto::PageQuery;

use super::page::render;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (category, page) = state
        .blog
        .category_posts(&path.into_inner(), query.page.as_deref())
        .await?;

    render(
        &state,
        &req,
        identity.viewer(),
        "blog/category.html",
        json!({ "category": category, "page_obj": page }),
    )
}
