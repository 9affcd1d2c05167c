//! Dataset browsing: filtered rows and summary counts

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use rsm_common::feedback::{latest_corrections, FeedbackSummary};
use rsm_common::Label;

use crate::filters::{FilterOptions, FilterQuery, ReviewFilter};
use crate::{ApiError, ApiResult, AppState};

/// Key used for rows without a model label
const UNKNOWN_LABEL: &str = "unknown";

/// One dataset row as shown in the table
#[derive(Debug, Serialize)]
pub struct ReviewRow {
    /// Position in the dataset file
    pub row: usize,
    pub review_id: String,
    pub restaurant_name: String,
    pub city: String,
    pub stars: i64,
    pub text_clean: String,
    pub label_proxy: Label,
    pub model_label: Option<Label>,
    /// Latest human correction, if any
    pub corrected_label: Option<Label>,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub dataset: String,
    pub total: usize,
    pub filtered: usize,
    pub rows: Vec<ReviewRow>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub dataset: String,
    pub total: usize,
    pub filtered: usize,
    pub feedback: FeedbackSummary,
    /// Model label distribution over the filtered rows
    pub model_labels: BTreeMap<String, usize>,
    pub options: FilterOptions,
}

fn parse_filter(query: Result<Query<FilterQuery>, QueryRejection>) -> ApiResult<ReviewFilter> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    ReviewFilter::from_query(&query)
}

/// GET /api/reviews?city&restaurant&stars
pub async fn get_reviews(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> ApiResult<Json<ReviewsResponse>> {
    let filter = parse_filter(query)?;
    let dataset = state.dataset()?;
    let corrections = latest_corrections(&state.feedback.load_feedback());

    let rows: Vec<ReviewRow> = filter
        .apply(&dataset.reviews)
        .map(|(row, r)| ReviewRow {
            row,
            review_id: r.review.review_id.clone(),
            restaurant_name: r.review.restaurant_name.clone(),
            city: r.review.city.clone(),
            stars: r.review.stars,
            text_clean: r.review.text_clean.clone(),
            label_proxy: r.label_proxy,
            model_label: r.model_label,
            corrected_label: corrections.get(r.review_id()).copied(),
        })
        .collect();

    Ok(Json(ReviewsResponse {
        dataset: dataset.path.display().to_string(),
        total: dataset.reviews.len(),
        filtered: rows.len(),
        rows,
    }))
}

/// GET /api/summary?city&restaurant&stars
pub async fn get_summary(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let filter = parse_filter(query)?;
    let dataset = state.dataset()?;
    let feedback = state.feedback.load_feedback();

    let mut model_labels: BTreeMap<String, usize> = Label::ALL
        .iter()
        .map(|l| (l.to_string(), 0))
        .chain(std::iter::once((UNKNOWN_LABEL.to_string(), 0)))
        .collect();
    let mut filtered = 0;
    for (_, review) in filter.apply(&dataset.reviews) {
        filtered += 1;
        let key = review.model_label.map(|l| l.as_str()).unwrap_or(UNKNOWN_LABEL);
        *model_labels.entry(key.to_string()).or_default() += 1;
    }

    Ok(Json(SummaryResponse {
        dataset: dataset.path.display().to_string(),
        total: dataset.reviews.len(),
        filtered,
        feedback: FeedbackSummary::from_records(&feedback, rsm_common::time::today_utc()),
        model_labels,
        options: FilterOptions::from_reviews(&dataset.reviews),
    }))
}

/// Build dataset browsing routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", get(get_reviews))
        .route("/api/summary", get(get_summary))
}
