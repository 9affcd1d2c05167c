//! Metrics stage: predictions -> evaluation artifacts
//!
//! Rows lacking a model label are skipped. Nothing is written unless the
//! confusion matrix and report were both computed.

use std::path::Path;

use tracing::info;

use rsm_common::config::DataPaths;
use rsm_common::metrics::{compute_metrics, ClassificationReport, ConfusionMatrix, EvaluationArtifacts};
use rsm_common::snapshot::read_label_columns;

use crate::error::{PipelineError, Result};

/// Outcome of one evaluation run
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    pub report: ClassificationReport,
    /// Rows skipped for lack of a model label
    pub unlabeled: usize,
}

/// Evaluate `dataset` and overwrite `artifacts`
pub fn evaluate(dataset: &Path, artifacts: &EvaluationArtifacts) -> Result<Evaluation> {
    if !dataset.is_file() {
        return Err(PipelineError::MissingInput(format!(
            "{} does not exist",
            dataset.display()
        )));
    }

    let columns = read_label_columns(dataset)?;
    let (truth, predicted) = columns.defined_pairs();
    if truth.is_empty() {
        return Err(PipelineError::EmptyDataset(format!(
            "{} has no rows with both label_proxy and model_label",
            dataset.display()
        )));
    }

    let (matrix, report) = compute_metrics(&truth, &predicted)?;
    artifacts.write(&matrix, &report)?;

    Ok(Evaluation {
        matrix,
        report,
        unlabeled: columns.label_proxy.len() - truth.len(),
    })
}

/// Evaluate `processed/predictions.parquet` into `processed/`
pub fn run_metrics(paths: &DataPaths) -> Result<Evaluation> {
    let evaluation = evaluate(&paths.predictions_snapshot(), &paths.evaluation_artifacts())?;
    info!(
        "Evaluated {} reviews: accuracy {:.4}, macro F1 {:.4}",
        evaluation.matrix.total(),
        evaluation.report.accuracy,
        evaluation.report.macro_avg.f1
    );
    if evaluation.unlabeled > 0 {
        info!("Skipped {} reviews without a model label", evaluation.unlabeled);
    }
    Ok(evaluation)
}
