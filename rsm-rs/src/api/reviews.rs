//! Synthetic review batches
//!
//! `GET /reviews?limit=N&seed=S` returns `N` reviews (default 50, 1..=500).
//! The same seed always yields the same reviews apart from `created_at`.

use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use rsm_common::review::RawReview;

use crate::generator::{ReviewGenerator, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for review generation
#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    /// Number of reviews to generate
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Seed for reproducible batches; any 64-bit integer, negatives included
    pub seed: Option<i64>,
}

impl ReviewQuery {
    /// Generator seed. The bit pattern is reused, so distinct query seeds
    /// give distinct generator seeds.
    fn generator_seed(&self) -> Option<u64> {
        self.seed.map(|seed| seed as u64)
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

/// GET /reviews
pub async fn get_reviews(
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RawReview>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if query.limit < MIN_LIMIT as i64 || query.limit > MAX_LIMIT as i64 {
        return Err(ApiError::Validation(format!(
            "limit must be between {} and {}, got {}",
            MIN_LIMIT, MAX_LIMIT, query.limit
        )));
    }

    let now = rsm_common::time::now().naive_utc();
    let reviews = ReviewGenerator::new(query.generator_seed()).generate(query.limit as usize, now);
    debug!(
        "Generated {} reviews (seed: {:?})",
        reviews.len(),
        query.seed
    );

    Ok(Json(reviews))
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/reviews", get(get_reviews))
}
