use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while the application boots.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A self-contained slice of the API (users, books, auth).
///
/// The registry drives the lifecycle in order: every module is `init`ed,
/// then `start`ed, and `stop`ped in reverse once the server has drained.
#[async_trait]
pub trait Module: Sync + Send {
    /// Mount point segment; routes end up under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Runs before the listener binds. An error aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes with state already applied, relative to the mount point.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment holding `paths` and `components.schemas`.
    /// Path keys are relative to the mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once during shutdown, after in-flight requests finish.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
