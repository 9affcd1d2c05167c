//! # RSM Common Library
//!
//! Shared code for all RSM (Restaurant Sentiment Monitor) modules including:
//! - Canonical sentiment labels and raw-output normalization
//! - Review text cleaning and the star-rating proxy labeler
//! - Classification metrics and their durable artifacts
//! - The append-only feedback log
//! - Parquet dataset snapshots and latest-snapshot resolution
//! - Configuration loading and well-known data paths

pub mod atomic;
pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod label;
pub mod metrics;
pub mod proxy;
pub mod review;
pub mod snapshot;
pub mod text;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use label::{parse_label, Label};
pub use proxy::stars_to_label;
pub use text::clean_text;
