//! Evaluation artifacts written by `rsm-pl metrics`
//!
//! Either artifact may be missing or unreadable; its field is then `null`
//! and `hint` says how to produce it.

use std::fs;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use rsm_common::metrics::ConfusionMatrix;
use rsm_common::Label;

use crate::AppState;

const METRICS_HINT: &str = "run the pipeline first (rsm-pl metrics)";

#[derive(Debug, Serialize)]
pub struct MatrixView {
    /// Row and column order
    pub labels: [Label; 3],
    /// `counts[true][predicted]`
    pub counts: [[u64; 3]; 3],
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub report: Option<String>,
    pub confusion_matrix: Option<MatrixView>,
    pub hint: Option<String>,
}

/// GET /api/evaluation
pub async fn get_evaluation(State(state): State<AppState>) -> Json<EvaluationResponse> {
    let artifacts = state.paths.evaluation_artifacts();

    let report = match fs::read_to_string(&artifacts.classification_report) {
        Ok(text) => Some(text),
        Err(e) => {
            if artifacts.classification_report.exists() {
                warn!(
                    "Unreadable report {}: {}",
                    artifacts.classification_report.display(),
                    e
                );
            }
            None
        }
    };

    let confusion_matrix = if artifacts.confusion_matrix.exists() {
        match ConfusionMatrix::read_csv(&artifacts.confusion_matrix) {
            Ok(matrix) => Some(MatrixView {
                labels: Label::ALL,
                counts: *matrix.counts(),
            }),
            Err(e) => {
                warn!(
                    "Unreadable confusion matrix {}: {}",
                    artifacts.confusion_matrix.display(),
                    e
                );
                None
            }
        }
    } else {
        None
    };

    let hint = (report.is_none() || confusion_matrix.is_none()).then(|| METRICS_HINT.to_string());

    Json(EvaluationResponse {
        report,
        confusion_matrix,
        hint,
    })
}

/// Build evaluation routes
pub fn evaluation_routes() -> Router<AppState> {
    Router::new().route("/api/evaluation", get(get_evaluation))
}
