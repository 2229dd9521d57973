use anyhow::Context;
use shelf_app::AppState;
use shelf_kernel::{InitCtx, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.storage.backend,
        "shelf-app bootstrap starting"
    );

    let state = AppState::from_settings(&settings).await?;
    let registry = shelf_app::init_modules(&settings, &state).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.start_all(&ctx).await.context("module start failed")?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await.context("module stop failed")?;
    served
}
