//! Database-specific error types and conversions.

use taskman_core::error::TaskmanError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed {entity} row: {message}")]
    Decode { entity: String, message: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify an error raised by a write statement. Unique index
    /// violations become [`DbError::Duplicate`].
    pub(crate) fn from_write(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn decode(entity: &str, message: impl Into<String>) -> Self {
        DbError::Decode {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

impl From<DbError> for TaskmanError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TaskmanError::NotFound { entity, id },
            DbError::Duplicate { entity } => TaskmanError::AlreadyExists { entity },
            other => TaskmanError::Database(other.to_string()),
        }
    }
}
