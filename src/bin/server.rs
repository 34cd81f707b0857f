use std::sync::Arc;

use anyhow::Context;

use jobwatch::config::Config;
use jobwatch::service::{AppState, ServiceConfig, routes};
use jobwatch::tracker::{ParityRule, StatusTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    let _log_guard = jobwatch::logging::init(&cfg.log_directory, &cfg.server_log_file)?;

    tracing::info!("Server is starting...");

    let tracker = Arc::new(StatusTracker::new(
        cfg.completion_window,
        Box::new(ParityRule),
    ));
    let state = AppState::new(
        tracker,
        ServiceConfig {
            poll_step: cfg.poll_step,
            polling_timeout: cfg.server_polling_timeout,
            max_concurrent_polls: cfg.max_concurrent_polls,
        },
    );

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "Status service listening");

    axum::serve(listener, routes(state)).await?;
    Ok(())
}
