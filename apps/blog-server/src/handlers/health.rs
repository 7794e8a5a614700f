//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::observability::RequestId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
    pub request_id: String,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        timestamp: state.blog.now().to_rfc3339(),
        request_id: request_id.as_str().to_string(),
    })
}
