//! Domain errors returned by the user and book services.

use shelf_authz::{NotOwner, TokenError};
use shelf_db::StoreError;
use shelf_http::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid email or password")]
    Unauthorized,

    #[error(transparent)]
    Forbidden(#[from] NotOwner),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("store error: {message}")]
    Store { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Backend { message } => Self::Store { message },
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => AppError::unauthorized(err.to_string()),
            ServiceError::Forbidden(_) => AppError::forbidden(err.to_string()),
            ServiceError::NotFound { .. } => AppError::not_found(err.to_string()),
            ServiceError::Store { .. } | ServiceError::Token(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn store_not_found_stays_not_found() {
        let err = ServiceError::from(StoreError::not_found("book", 3));
        assert!(matches!(err, ServiceError::NotFound { entity: "book", .. }));
        assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_failures_become_internal() {
        let err = ServiceError::from(StoreError::backend("connection reset"));
        assert_eq!(
            AppError::from(err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn ownership_failures_are_forbidden() {
        let err = ServiceError::from(NotOwner {
            caller: 1,
            owner: 2,
            resource: "book",
        });
        assert_eq!(AppError::from(err).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::from(ServiceError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
