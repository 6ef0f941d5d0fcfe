pub mod config;
pub mod core;
pub mod providers;
pub mod server;

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::providers::CurrencyApiProvider;
use crate::server::AppState;

/// Builds the router backed by the configured upstream provider.
pub fn create_app(config: &AppConfig) -> Result<Router> {
    config.validate()?;
    let provider = CurrencyApiProvider::new(&config.upstream)?;
    Ok(server::router(AppState::new(Arc::new(provider))))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    debug!(
        upstream = %config.upstream.base_url,
        timeout_secs = config.upstream.timeout_secs,
        "Loaded config"
    );
    let app = create_app(&config)?;

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Server listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Starts the server in a background task and returns the bound address.
///
/// A configured port of `0` binds a random free port.
pub async fn start_server(config: AppConfig) -> Result<SocketAddr> {
    let app = create_app(&config)?;

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let local_addr = listener.local_addr()?;
    info!("Started server on {}", local_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}
