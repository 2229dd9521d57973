//! Shared handler state: the services and the authorization gate.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use shelf_authz::{AuthGate, TokenService};
use shelf_db::Stores;
use shelf_kernel::Settings;

use crate::modules::books::service::BookService;
use crate::modules::users::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub books: BookService,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    /// Wire services over already-built stores.
    pub fn new(stores: Stores, tokens: TokenService) -> Self {
        Self {
            users: UserService::new(stores.users, tokens.clone()),
            books: BookService::new(stores.books),
            gate: Arc::new(AuthGate::new(tokens)),
        }
    }

    /// Connect the configured backend and build the state around it.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let stores = shelf_db::connect(&settings.storage)
            .await
            .context("failed to initialise storage")?;
        Ok(Self::new(stores, TokenService::from_settings(&settings.auth)))
    }
}

impl FromRef<AppState> for Arc<AuthGate> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.gate)
    }
}
