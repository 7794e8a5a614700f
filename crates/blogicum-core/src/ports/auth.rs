//! Author sessions: bearer tokens and password hashes.

use uuid::Uuid;

/// Who a bearer token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    /// Username at issue time; a later profile edit does not update it.
    pub username: String,
}

pub trait TokenService: Send + Sync {
    fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String, AuthError>;

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, reported to clients as `expires_in`.
    fn expiration_seconds(&self) -> i64;
}

pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
