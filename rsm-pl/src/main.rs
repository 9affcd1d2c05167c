//! rsm-pl (Pipeline) - Batch stages from raw reviews to evaluation artifacts
//!
//! Exits non-zero on any stage failure. Errors caused by missing upstream
//! artifacts tell the user to run the pipeline first.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rsm_common::config::{resolve_data_root, DataPaths, TomlConfig};
use rsm_pl::evaluate::run_metrics;
use rsm_pl::fetch::{run_fetch, ReviewClient, DEFAULT_API_URL, DEFAULT_FETCH_LIMIT, DEFAULT_SEED};
use rsm_pl::predict::{run_predict, LexiconModel};
use rsm_pl::preprocess::run_preprocess;
use tracing::info;

/// Command-line arguments for rsm-pl
#[derive(Parser, Debug)]
#[command(name = "rsm-pl")]
#[command(about = "Restaurant review sentiment pipeline")]
#[command(version)]
struct Cli {
    /// Data root holding raw/ and processed/
    #[arg(short, long, global = true)]
    data_root: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "RSM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
struct FetchArgs {
    /// Review simulator base URL
    #[arg(long, env = "RSM_API_URL")]
    api_url: Option<String>,

    /// Number of reviews to request (1-500)
    #[arg(short, long, env = "RSM_FETCH_LIMIT")]
    limit: Option<u32>,

    /// Seed for a reproducible batch
    #[arg(short, long, env = "RSM_SEED", allow_negative_numbers = true)]
    seed: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a batch of reviews into raw/
    Fetch(FetchArgs),

    /// Clean the latest raw snapshot into processed/clean.parquet
    Preprocess,

    /// Label processed/clean.parquet into processed/predictions.parquet
    Predict,

    /// Write the confusion matrix and classification report
    Metrics,

    /// fetch, preprocess, predict and metrics in sequence
    Run(FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TomlConfig::load(cli.config.as_deref());

    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("RSM Pipeline (rsm-pl) v{}", env!("CARGO_PKG_VERSION"));

    let config = config.context("Failed to load configuration")?;
    config.log_source();

    let paths = DataPaths::new(resolve_data_root(cli.data_root.as_deref(), &config));
    info!("Data root: {}", paths.root().display());

    match cli.command {
        Commands::Fetch(args) => {
            fetch(&paths, &config, args).await?;
        }
        Commands::Preprocess => {
            run_preprocess(&paths).context("preprocess failed")?;
        }
        Commands::Predict => {
            run_predict(&paths, &LexiconModel::default()).context("predict failed")?;
        }
        Commands::Metrics => {
            let evaluation = run_metrics(&paths).context("metrics failed")?;
            println!("{}", evaluation.report);
        }
        Commands::Run(args) => {
            fetch(&paths, &config, args).await?;
            run_preprocess(&paths).context("preprocess failed")?;
            run_predict(&paths, &LexiconModel::default()).context("predict failed")?;
            let evaluation = run_metrics(&paths).context("metrics failed")?;
            println!("{}", evaluation.report);
        }
    }

    Ok(())
}

async fn fetch(paths: &DataPaths, config: &TomlConfig, args: FetchArgs) -> Result<PathBuf> {
    let api_url = args
        .api_url
        .or_else(|| config.pipeline.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let limit = args
        .limit
        .or(config.pipeline.fetch_limit)
        .unwrap_or(DEFAULT_FETCH_LIMIT);
    let seed = args.seed.or(config.pipeline.seed).unwrap_or(DEFAULT_SEED);

    let client = ReviewClient::new(&api_url)?;
    run_fetch(paths, &client, limit, Some(seed))
        .await
        .with_context(|| format!("fetch from {} failed", client.base_url()))
}
