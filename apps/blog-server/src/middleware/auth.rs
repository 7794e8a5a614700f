//! Bearer-token identity extractors.

use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode, http::header, web};
use std::fmt;
use std::future::{Ready, ready};
use std::sync::Arc;

use uuid::Uuid;

use blogicum_core::domain::Viewer;
use blogicum_core::ports::{AuthError, TokenClaims, TokenService};
use blogicum_shared::ErrorResponse;

/// Authenticated user. Handlers taking this reject anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn viewer(&self) -> Viewer {
        Viewer::User(self.user_id)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone()),
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            _ => ErrorResponse::internal_error(),
        };

        HttpResponse::build(self.status_code()).json(error.with_error_page())
    }
}

/// Token from `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(token_service) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
        tracing::error!("TokenService not found in app data");
        return Err(AuthError::InvalidToken("Server configuration error".to_string()));
    };

    let token = bearer_token(req)?;
    token_service.validate_token(token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(AuthenticationError))
    }
}

/// Identity for pages anyone may see. Bad or missing tokens read as anonymous.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map_or(Viewer::Anonymous, Identity::viewer)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(e) => {
                if !matches!(e, AuthError::MissingAuth) {
                    tracing::debug!(error = %e, "Ignoring unusable credentials");
                }
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
