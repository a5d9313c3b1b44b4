//! Error types for the Taskman system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskmanError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskmanError {
    /// HTTP status the surrounding layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            TaskmanError::Validation { .. } => 400,
            TaskmanError::AuthenticationFailed { .. } => 401,
            TaskmanError::AuthorizationDenied { .. } => 403,
            TaskmanError::NotFound { .. } => 404,
            TaskmanError::AlreadyExists { .. } => 409,
            TaskmanError::Database(_) => 503,
            TaskmanError::Crypto(_) | TaskmanError::Internal(_) => 500,
        }
    }
}

pub type TaskmanResult<T> = Result<T, TaskmanError>;
