//! rsm-pl library - Pipeline module
//!
//! Batch stages, each reading the previous stage's artifact under the data
//! root and writing its own:
//!
//! | stage        | reads                          | writes |
//! |--------------|--------------------------------|--------|
//! | `fetch`      | review simulator `GET /reviews`| `raw/reviews_<ts>.parquet` |
//! | `preprocess` | latest `raw/*.parquet`         | `processed/clean.parquet` |
//! | `predict`    | `processed/clean.parquet`      | `processed/predictions.parquet` |
//! | `metrics`    | `processed/predictions.parquet`| `processed/confusion_matrix.csv`, `processed/classification_report.txt` |

pub mod error;
pub mod evaluate;
pub mod fetch;
pub mod predict;
pub mod preprocess;

pub use crate::error::{PipelineError, Result, RUN_PIPELINE_HINT};
