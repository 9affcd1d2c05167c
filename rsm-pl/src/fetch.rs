//! Fetch stage: pull a batch from the review simulator into a raw snapshot

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use rsm_common::config::DataPaths;
use rsm_common::review::RawReview;
use rsm_common::snapshot::{raw_snapshot_name, write_raw_reviews};

use crate::error::{PipelineError, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_FETCH_LIMIT: u32 = 300;
pub const DEFAULT_SEED: i64 = 42;

const USER_AGENT: &str = concat!("rsm-pl/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ReviewQuery {
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

/// HTTP client for the review simulator
pub struct ReviewClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ReviewClient {
    /// Client for the simulator at `base_url` (e.g. `http://127.0.0.1:8000`)
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /reviews?limit&seed
    pub async fn fetch_reviews(&self, limit: u32, seed: Option<i64>) -> Result<Vec<RawReview>> {
        let url = format!("{}/reviews", self.base_url);
        debug!(url = %url, limit, seed = ?seed, "Requesting reviews");

        let response = self
            .http_client
            .get(&url)
            .query(&ReviewQuery { limit, seed })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Source(status.as_u16(), error_text));
        }

        Ok(response.json().await?)
    }
}

/// Write `reviews` as a new raw snapshot stamped with `at`
pub fn save_raw(paths: &DataPaths, reviews: &[RawReview], at: DateTime<Utc>) -> Result<PathBuf> {
    paths.ensure_dirs()?;
    let path = paths.raw_dir().join(raw_snapshot_name(at));
    write_raw_reviews(&path, reviews)?;
    Ok(path)
}

/// Fetch one batch and store it under `raw/`
pub async fn run_fetch(
    paths: &DataPaths,
    client: &ReviewClient,
    limit: u32,
    seed: Option<i64>,
) -> Result<PathBuf> {
    let reviews = client.fetch_reviews(limit, seed).await?;
    let path = save_raw(paths, &reviews, rsm_common::time::now())?;
    info!("Saved {} | rows={}", path.display(), reviews.len());
    Ok(path)
}
