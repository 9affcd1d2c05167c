//! rsm-rs library - Review Simulator module
//!
//! Serves synthetic Spanish-language restaurant reviews over HTTP so the
//! pipeline has a local, reproducible review source.

use axum::Router;
use chrono::{DateTime, Utc};

pub mod api;
pub mod error;
pub mod generator;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Service startup timestamp
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            startup_time: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::review_routes())
        .merge(api::health_routes())
        .with_state(state)
}
