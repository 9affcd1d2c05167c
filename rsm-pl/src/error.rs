//! Error types for rsm-pl

use thiserror::Error;

/// Guidance appended to errors caused by missing upstream artifacts
pub const RUN_PIPELINE_HINT: &str = "run the pipeline first";

/// Pipeline stage error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An upstream artifact does not exist yet
    #[error("Missing input: {0} ({hint})", hint = RUN_PIPELINE_HINT)]
    MissingInput(String),

    /// Input exists but holds nothing to work on
    #[error("Empty dataset: {0} ({hint})", hint = RUN_PIPELINE_HINT)]
    EmptyDataset(String),

    /// Review source returned a non-success status
    #[error("Review source error {0}: {1}")]
    Source(u16, String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// rsm-common error
    #[error(transparent)]
    Common(#[from] rsm_common::Error),
}

impl PipelineError {
    /// Map a missing file or snapshot to [`PipelineError::MissingInput`]
    pub fn from_missing(err: rsm_common::Error, what: &str) -> Self {
        match err {
            rsm_common::Error::NotFound(msg) => {
                PipelineError::MissingInput(format!("{}: {}", what, msg))
            }
            rsm_common::Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
                PipelineError::MissingInput(format!("{}: {}", what, e))
            }
            other => PipelineError::Common(other),
        }
    }
}

/// Convenience Result type for pipeline stages
pub type Result<T> = std::result::Result<T, PipelineError>;
