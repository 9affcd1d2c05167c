//! rsm-fb library - Feedback Dashboard module
//!
//! Browses the latest pipeline output, shows evaluation artifacts and lets a
//! reviewer correct individual labels. Corrections are appended to the
//! feedback log; the dataset itself is never modified.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use rsm_common::cache::FileCache;
use rsm_common::config::DataPaths;
use rsm_common::feedback::FeedbackStore;
use rsm_common::review::LabeledReview;
use rsm_common::snapshot::read_labeled_reviews;
use rsm_common::Error;

pub mod api;
pub mod error;
pub mod filters;

pub use crate::error::{ApiError, ApiResult};

const RUN_PIPELINE_HINT: &str = "run the pipeline first (rsm-pl run)";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub paths: DataPaths,
    pub feedback: FeedbackStore,
    /// Decoded datasets, reloaded when the file on disk changes
    pub datasets: Arc<FileCache<Vec<LabeledReview>>>,
    /// Service startup timestamp
    pub startup_time: DateTime<Utc>,
}

/// Dataset currently shown by the dashboard
pub struct Dataset {
    pub path: PathBuf,
    pub reviews: Arc<Vec<LabeledReview>>,
}

impl AppState {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            feedback: FeedbackStore::new(paths.feedback_log()),
            paths,
            datasets: Arc::new(FileCache::new()),
            startup_time: Utc::now(),
        }
    }

    /// Predictions snapshot if present, else the clean snapshot.
    ///
    /// Missing or unreadable datasets are reported as unavailable.
    pub fn dataset(&self) -> ApiResult<Dataset> {
        let path = self.paths.dashboard_dataset().ok_or_else(|| {
            ApiError::Unavailable(format!(
                "No dataset under {}; {}",
                self.paths.processed_dir().display(),
                RUN_PIPELINE_HINT
            ))
        })?;

        match self.datasets.get_or_load(&path, read_labeled_reviews) {
            Ok(reviews) => Ok(Dataset { path, reviews }),
            Err(e @ (Error::Schema(_) | Error::Parquet(_) | Error::Arrow(_))) => {
                Err(ApiError::Unavailable(format!(
                    "Dataset {} is unreadable ({}); {}",
                    path.display(),
                    e,
                    RUN_PIPELINE_HINT
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::review_routes())
        .merge(api::feedback_routes())
        .merge(api::evaluation_routes())
        .merge(api::health_routes())
        .with_state(state)
}
