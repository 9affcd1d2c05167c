//! Common error types for RSM

use thiserror::Error;

/// Common result type for RSM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across RSM modules
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet file error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow record batch error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (validation failure)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dataset does not have the expected columns or column types
    #[error("Schema error: {0}")]
    Schema(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
