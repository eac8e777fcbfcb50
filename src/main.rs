use dotenvy::dotenv;
use shoplog::app::AppState;
use shoplog::config;
use shoplog::errors::Result;
use shoplog::sync::Mode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal; env vars can be set externally.
    dotenv().ok();

    let app_config = config::load_app_configuration()?;
    let state = AppState::load(&app_config).await;

    for (kind, count) in state.summary().await {
        info!(%kind, count, "collection loaded");
    }

    match state.mode() {
        Mode::Connected => {
            let subscriptions = state.attach_subscriptions();
            info!("connected; press ctrl-c to stop");
            tokio::signal::ctrl_c().await?;
            subscriptions.teardown();
        }
        Mode::Local => {
            info!(
                data_dir = %app_config.data_dir.display(),
                "running in local mode, state persists to the mirror"
            );
        }
    }

    Ok(())
}
