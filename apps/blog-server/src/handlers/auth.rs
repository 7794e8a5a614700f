//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use blogicum_core::domain::User;
use blogicum_core::forms::{is_valid_email, is_valid_username};
use blogicum_core::ports::{AuthError, BaseRepository, PasswordService, TokenService};
use blogicum_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

pub(super) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at,
    }
}

fn bearer(token_service: &dyn TokenService, user: &User) -> AppResult<AuthResponse> {
    let access_token = token_service.generate_token(user.id, &user.username)?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();
    let email = req.email.trim();

    if !is_valid_username(username) {
        return Err(AppError::BadRequest("Invalid username".to_string()));
    }
    if !email.is_empty() && !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.users.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;
    let user = state
        .users
        .save(User::new(username.to_string(), email.to_string(), password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(bearer(&***token_service, &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password_service.verify(&req.password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "Rejected login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(bearer(&***token_service, &user)?))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
