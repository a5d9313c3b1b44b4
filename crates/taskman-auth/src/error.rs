//! Authentication error types.

use taskman_core::error::TaskmanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("authentication required")]
    Unauthenticated,

    #[error("operation not permitted")]
    Forbidden,

    #[error("account not found")]
    AccountNotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<TaskmanError> for AuthError {
    fn from(err: TaskmanError) -> Self {
        match err {
            TaskmanError::AlreadyExists { .. } => AuthError::DuplicateAccount,
            TaskmanError::NotFound { .. } => AuthError::AccountNotFound,
            TaskmanError::Database(msg) => AuthError::StoreUnavailable(msg),
            TaskmanError::Validation { message } => AuthError::Validation(message),
            TaskmanError::Crypto(msg) => AuthError::Crypto(msg),
            TaskmanError::AuthenticationFailed { .. } => AuthError::Unauthenticated,
            TaskmanError::AuthorizationDenied { .. } => AuthError::Forbidden,
            TaskmanError::Internal(msg) => AuthError::Internal(msg),
        }
    }
}

/// Collapses every security failure to "not authenticated" or "not
/// permitted" so the boundary never reveals which check failed.
impl From<AuthError> for TaskmanError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::Unauthenticated => TaskmanError::AuthenticationFailed {
                reason: "not authenticated".into(),
            },
            AuthError::Forbidden => TaskmanError::AuthorizationDenied {
                reason: "not permitted".into(),
            },
            AuthError::DuplicateAccount => TaskmanError::AlreadyExists {
                entity: "account".into(),
            },
            AuthError::AccountNotFound => TaskmanError::NotFound {
                entity: "account".into(),
                id: String::new(),
            },
            AuthError::Validation(message) => TaskmanError::Validation { message },
            AuthError::StoreUnavailable(msg) => TaskmanError::Database(msg),
            AuthError::Crypto(msg) => TaskmanError::Crypto(msg),
            AuthError::Internal(msg) => TaskmanError::Internal(msg),
        }
    }
}
