//! Market Gateway - A caching HTTP gateway for market data
//!
//! Wires configuration, the upstream client and the router together.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_gateway::api::create_router;
use market_gateway::{AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Load `.env` if present
/// 2. Initialize tracing subscriber for logging
/// 3. Load configuration from environment variables
/// 4. Open the persistent cache and build the upstream client
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Market Gateway");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: base_url={}, db_path={}, volatile_ttl={}s, default_ttl={}s, timeout={}s, port={}",
        config.base_url,
        config.db_path.display(),
        config.volatile_ttl,
        config.default_persistent_ttl,
        config.request_timeout,
        config.server_port
    );

    let state = AppState::from_config(&config).context("failed to initialize upstream client")?;
    info!("Caches initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
