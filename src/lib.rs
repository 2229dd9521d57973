//! Shelf application library
//!
//! Users and books over HTTP, where every mutation is checked against the
//! caller's identity. The binary in `main.rs` and the integration tests both
//! build on [`init_modules`].

use anyhow::Context;
use shelf_kernel::{InitCtx, ModuleRegistry, Settings};

pub mod modules;
pub mod state;
pub mod utils;

pub use state::AppState;

/// Register and initialise every module against one shared state.
pub async fn init_modules(settings: &Settings, state: &AppState) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, state).context("failed to register modules")?;

    registry
        .init_all(&InitCtx { settings })
        .await
        .context("module initialisation failed")?;

    Ok(registry)
}
