//! `GET /api/buildinfo`: what is running and which data it is looking at
//!
//! The build stamp comes from `build.rs`. The data part reflects the current
//! state of the data root, so the footer in the UI shows whether the
//! dashboard is reading predictions or only the cleaned snapshot.

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub module: &'static str,
    pub version: &'static str,
    /// Short commit hash, `-dirty` when built from a modified tree
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub data_root: String,
    /// File name of the dataset being served, if any
    pub dataset: Option<String>,
}

/// GET /api/buildinfo
pub async fn get_build_info(State(state): State<AppState>) -> Json<BuildInfo> {
    let dataset = state
        .paths
        .dashboard_dataset()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()));

    Json(BuildInfo {
        module: "rsm-fb",
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        build_profile: env!("BUILD_PROFILE"),
        data_root: state.paths.root().display().to_string(),
        dataset,
    })
}
