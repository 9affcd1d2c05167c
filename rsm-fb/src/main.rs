//! rsm-fb (Feedback Dashboard) - Review browser and label correction UI
//!
//! Serves the dashboard on port 8501 by default. The feedback log is created
//! on startup so the first correction never races header creation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rsm_common::config::{resolve_data_root, DataPaths, TomlConfig};
use rsm_fb::{build_router, AppState};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8501;

/// Command-line arguments for rsm-fb
#[derive(Parser, Debug)]
#[command(name = "rsm-fb")]
#[command(about = "Feedback Dashboard service for RSM")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "RSM_FB_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RSM_FB_PORT")]
    port: Option<u16>,

    /// Data root holding processed/
    #[arg(short, long)]
    data_root: Option<PathBuf>,

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
        "Starting RSM Feedback Dashboard (rsm-fb) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config.context("Failed to load configuration")?;
    config.log_source();

    let paths = DataPaths::new(resolve_data_root(args.data_root.as_deref(), &config));
    info!("Data root: {}", paths.root().display());

    let state = AppState::new(paths);
    state
        .feedback
        .ensure_store()
        .context("Failed to create feedback log")?;
    info!("Feedback log: {}", state.feedback.path().display());

    match state.paths.dashboard_dataset() {
        Some(path) => info!("Dataset: {}", path.display()),
        None => warn!("No dataset yet; run the pipeline first (rsm-pl run)"),
    }

    let host = args
        .host
        .or(config.dashboard.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(config.dashboard.port).unwrap_or(DEFAULT_PORT);

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("rsm-fb listening on http://{}", addr);

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
