//! Page rendering, redirects and one-shot notices.
//!
//! A notice set on a redirect travels in the `flash` cookie and is shown as
//! `messages` by the next rendered page, which then clears the cookie.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde_json::{Value, json};
use uuid::Uuid;

use blogicum_core::domain::Viewer;
use blogicum_shared::Notice;

use crate::middleware::error::AppResult;
use crate::state::AppState;

pub const FLASH_COOKIE: &str = "flash";

pub fn post_url(id: Uuid) -> String {
    format!("/posts/{id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Notices left by the previous redirect.
pub fn pending_notices(req: &HttpRequest) -> Vec<Notice> {
    req.cookie(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Render `template`, adding the viewer and pending notices to `context`.
pub fn render(
    state: &AppState,
    req: &HttpRequest,
    viewer: Viewer,
    template: &str,
    mut context: Value,
) -> AppResult<HttpResponse> {
    let had_flash = req.cookie(FLASH_COOKIE).is_some();

    if let Value::Object(map) = &mut context {
        map.insert("user".to_string(), json!(viewer.id()));
        map.insert("messages".to_string(), json!(pending_notices(req)));
    }

    let body = state.renderer.render(template, &context)?;

    let mut res = HttpResponse::Ok();
    res.content_type(state.renderer.content_type());
    if had_flash {
        res.cookie(expired_flash());
    }
    Ok(res.body(body))
}

/// `303 See Other` to `location`, optionally carrying a notice.
pub fn redirect(location: &str, notice: Option<Notice>) -> HttpResponse {
    let mut res = HttpResponse::SeeOther();
    res.insert_header((header::LOCATION, location));

    if let Some(notice) = notice {
        match serde_json::to_string(&[notice]) {
            Ok(value) => {
                res.cookie(Cookie::build(FLASH_COOKIE, value).path("/").http_only(true).finish());
            }
            Err(e) => tracing::warn!(error = %e, "Dropping notice that failed to serialize"),
        }
    }

    res.finish()
}

fn expired_flash() -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}
