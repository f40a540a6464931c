//! drydock coordinator server

use drydock_api::{AppState, routes};
use drydock_config::load_config;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration, defaulting when the file is absent
    let config_path = std::env::var("DRYDOCK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("drydock.kdl"));
    let config = load_config(&config_path)?;
    info!(config = ?config_path, bind = %config.bind, "configuration loaded");

    // Create app state
    let state = AppState::new(&config);

    // Build router
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    info!("Starting server on {}", config.bind);
    let listener = TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
