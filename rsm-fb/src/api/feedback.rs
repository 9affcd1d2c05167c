//! Label corrections
//!
//! `POST /api/feedback` looks the review up in the current dataset and
//! appends one record to the feedback log. `GET /api/feedback` lists the log.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use rsm_common::feedback::FeedbackRecord;
use rsm_common::Label;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub review_id: String,
    /// Must be a canonical label
    pub user_label: String,
}

/// POST /api/feedback
pub async fn post_feedback(
    State(state): State<AppState>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FeedbackRecord>)> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user_label: Label = request
        .user_label
        .parse()
        .map_err(|e: rsm_common::Error| ApiError::Validation(e.to_string()))?;

    let dataset = state.dataset()?;
    let review = dataset
        .reviews
        .iter()
        .find(|r| r.review_id() == request.review_id)
        .ok_or_else(|| {
            ApiError::NotFound(format!("review {} is not in the dataset", request.review_id))
        })?;

    let record = state.feedback.append_feedback(
        review.review_id(),
        &review.review.text_clean,
        review.model_label,
        user_label,
    )?;
    info!(
        "Correction for {} saved to {}",
        record.review_id,
        state.feedback.path().display()
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/feedback
pub async fn list_feedback(State(state): State<AppState>) -> Json<Vec<FeedbackRecord>> {
    Json(state.feedback.load_feedback())
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/api/feedback", get(list_feedback).post(post_feedback))
}
