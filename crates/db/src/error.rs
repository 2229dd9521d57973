//! Storage error types.

use thiserror::Error;

/// Errors raised by every store backend.
///
/// Backends only ever report a missing record as [`StoreError::NotFound`];
/// everything else the driver says is folded into [`StoreError::Backend`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::backend(format!("sqlite: {err}"))
    }
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::backend(format!("surrealdb: {err}"))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
