//! Domain-level error types.

use thiserror::Error;

use crate::forms::FormErrors;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    /// Field-level form failures; the caller redisplays the form.
    #[error("Invalid form: {0}")]
    InvalidForm(FormErrors),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "resource",
                key: String::new(),
            },
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
