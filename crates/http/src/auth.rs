//! Bearer-token extractor backed by the authorization gate.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use shelf_authz::{AuthGate, Identity};

use crate::error::AppError;

/// The authenticated caller. Handlers that take this run only after the gate passed.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AuthGate>::from_ref(state);

        let header = parts.headers.get(AUTHORIZATION).map(|value| value.as_bytes());
        let identity = gate.authorize_bytes(header)?;
        Ok(CurrentUser(identity))
    }
}
