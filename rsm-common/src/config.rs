//! Configuration loading and data root resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 are handled by each binary's `clap` arguments; this module
//! supplies levels 3 and 4 plus the data-root resolution shared by all of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::feedback::FEEDBACK_FILE;
use crate::metrics::EvaluationArtifacts;
use crate::{Error, Result};

/// Environment variable overriding the data root
pub const DATA_ROOT_ENV: &str = "RSM_DATA_ROOT";

/// Data root used when nothing else is configured
pub const DEFAULT_DATA_ROOT: &str = "data";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "rsm.toml";

pub const CLEAN_SNAPSHOT_FILE: &str = "clean.parquet";
pub const PREDICTIONS_SNAPSHOT_FILE: &str = "predictions.parquet";

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// File this config was read from; `None` for compiled defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub simulator: ServiceConfig,
    pub dashboard: ServiceConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bind address of one HTTP service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL of the review simulator
    pub api_url: Option<String>,
    pub fetch_limit: Option<u32>,
    pub seed: Option<i64>,
}

impl TomlConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, the search paths are tried in
    /// order and a missing file falls back to compiled defaults.
    ///
    /// Nothing is logged here since binaries load config before tracing is
    /// initialised; call [`TomlConfig::log_source`] afterwards.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Log where the configuration came from
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded config from {}", path.display()),
            None => warn!("No config file found, using compiled defaults"),
        }
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Candidate config files, most specific first
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("rsm").join("config.toml"));
    }
    paths
}

/// Resolve the data root: CLI > `RSM_DATA_ROOT` > TOML `data_root` > `data`
pub fn resolve_data_root(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_ROOT_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_root {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATA_ROOT)
}

/// Well-known locations under the data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Timestamped snapshots from the review source
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn clean_snapshot(&self) -> PathBuf {
        self.processed_dir().join(CLEAN_SNAPSHOT_FILE)
    }

    pub fn predictions_snapshot(&self) -> PathBuf {
        self.processed_dir().join(PREDICTIONS_SNAPSHOT_FILE)
    }

    pub fn feedback_log(&self) -> PathBuf {
        self.processed_dir().join(FEEDBACK_FILE)
    }

    pub fn evaluation_artifacts(&self) -> EvaluationArtifacts {
        EvaluationArtifacts::in_dir(&self.processed_dir())
    }

    /// Dataset shown by the dashboard: predictions if present, else the
    /// cleaned snapshot.
    pub fn dashboard_dataset(&self) -> Option<PathBuf> {
        [self.predictions_snapshot(), self.clean_snapshot()]
            .into_iter()
            .find(|p| p.is_file())
    }

    /// Create `raw/` and `processed/`
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.raw_dir())?;
        std::fs::create_dir_all(self.processed_dir())?;
        Ok(())
    }
}
