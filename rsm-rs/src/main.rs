//! rsm-rs (Review Simulator) - Synthetic review source
//!
//! Serves batches of Spanish restaurant reviews on `GET /reviews` for the
//! pipeline's fetch stage. Default port 8000.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rsm_common::config::TomlConfig;
use rsm_rs::{build_router, AppState};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Command-line arguments for rsm-rs
#[derive(Parser, Debug)]
#[command(name = "rsm-rs")]
#[command(about = "Review Simulator service for RSM")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "RSM_RS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RSM_RS_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "RSM_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref());

    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    info!(
        "Starting RSM Review Simulator (rsm-rs) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = config.context("Failed to load configuration")?;
    config.log_source();
    let host = args
        .host
        .or(config.simulator.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(config.simulator.port).unwrap_or(DEFAULT_PORT);

    let app = build_router(AppState::new()).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("rsm-rs listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C (or SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
