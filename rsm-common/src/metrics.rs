//! Classification metrics over the three canonical labels
//!
//! Compares proxy (true) labels against model predictions and produces:
//! - a fixed 3×3 confusion matrix (rows = true label, columns = predicted
//!   label, both in [`Label::ALL`] order, zero-filled for absent classes)
//! - a classification report with per-class precision/recall/F1/support,
//!   accuracy, and macro/weighted averages
//!
//! Division by zero yields 0.0 (a class that is never predicted has
//! precision 0, a class that never occurs has recall 0).
//!
//! Both results are persisted as `confusion_matrix.csv` and
//! `classification_report.txt`, overwritten atomically on each run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::atomic::{commit_all, stage_bytes};
use crate::{Error, Label, Result};

/// File name of the confusion matrix artifact
pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.csv";
/// File name of the classification report artifact
pub const CLASSIFICATION_REPORT_FILE: &str = "classification_report.txt";

const N: usize = Label::ALL.len();
const DIGITS: usize = 4;

/// True-label × predicted-label count table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    counts: [[u64; N]; N],
}

impl ConfusionMatrix {
    /// Count label pairs.
    ///
    /// Both sequences must be non-empty and of equal length.
    pub fn from_labels(true_labels: &[Label], predicted_labels: &[Label]) -> Result<Self> {
        validate_lengths(true_labels, predicted_labels)?;

        let mut matrix = Self::default();
        for (actual, predicted) in true_labels.iter().zip(predicted_labels) {
            matrix.counts[actual.index()][predicted.index()] += 1;
        }
        Ok(matrix)
    }

    /// Build from raw counts in [`Label::ALL`] order
    pub fn from_counts(counts: [[u64; N]; N]) -> Self {
        Self { counts }
    }

    pub fn get(&self, actual: Label, predicted: Label) -> u64 {
        self.counts[actual.index()][predicted.index()]
    }

    pub fn counts(&self) -> &[[u64; N]; N] {
        &self.counts
    }

    /// Sum of all cells
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Number of samples whose true label is `label` (support)
    pub fn actual_total(&self, label: Label) -> u64 {
        self.counts[label.index()].iter().sum()
    }

    /// Number of samples predicted as `label`
    pub fn predicted_total(&self, label: Label) -> u64 {
        self.counts.iter().map(|row| row[label.index()]).sum()
    }

    pub fn true_positives(&self, label: Label) -> u64 {
        self.get(label, label)
    }

    /// Correct predictions (trace)
    pub fn correct(&self) -> u64 {
        Label::ALL.iter().map(|l| self.true_positives(*l)).sum()
    }

    /// Render as CSV: an index column of true labels followed by one column
    /// per predicted label.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = vec![""];
        header.extend(Label::ALL.iter().map(|l| l.as_str()));
        writer.write_record(&header)?;

        for actual in Label::ALL {
            let mut record = vec![actual.as_str().to_string()];
            record.extend(self.counts[actual.index()].iter().map(|c| c.to_string()));
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("flushing confusion matrix: {}", e)))
    }

    /// Parse a matrix previously written by [`ConfusionMatrix::to_csv`].
    ///
    /// Rows and columns may appear in any order but every canonical label must
    /// appear exactly once on each axis.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.len() != N + 1 {
            return Err(Error::Schema(format!(
                "confusion matrix header has {} columns, expected {}",
                headers.len(),
                N + 1
            )));
        }
        let columns: Vec<Label> = headers
            .iter()
            .skip(1)
            .map(|h| h.parse::<Label>())
            .collect::<Result<_>>()?;
        ensure_permutation(&columns, "column")?;

        let mut matrix = Self::default();
        let mut rows = Vec::with_capacity(N);
        for record in reader.records() {
            let record = record?;
            if record.len() != N + 1 {
                return Err(Error::Schema(format!(
                    "confusion matrix row has {} fields, expected {}",
                    record.len(),
                    N + 1
                )));
            }
            let actual: Label = record[0].parse()?;
            for (field, predicted) in record.iter().skip(1).zip(&columns) {
                let count: u64 = field.trim().parse().map_err(|_| {
                    Error::Schema(format!("confusion matrix cell {:?} is not a count", field))
                })?;
                matrix.counts[actual.index()][predicted.index()] = count;
            }
            rows.push(actual);
        }
        ensure_permutation(&rows, "row")?;

        Ok(matrix)
    }
}

fn ensure_permutation(labels: &[Label], axis: &str) -> Result<()> {
    let complete = labels.len() == N && Label::ALL.iter().all(|l| labels.contains(l));
    if complete {
        Ok(())
    } else {
        Err(Error::Schema(format!(
            "confusion matrix {} labels {:?} are not exactly {:?}",
            axis,
            labels,
            Label::ALL
        )))
    }
}

fn validate_lengths(true_labels: &[Label], predicted_labels: &[Label]) -> Result<()> {
    if true_labels.is_empty() || predicted_labels.is_empty() {
        return Err(Error::InvalidInput(
            "label sequences must be non-empty".to_string(),
        ));
    }
    if true_labels.len() != predicted_labels.len() {
        return Err(Error::InvalidInput(format!(
            "label sequences differ in length: {} true vs {} predicted",
            true_labels.len(),
            predicted_labels.len()
        )));
    }
    Ok(())
}

/// Precision/recall/F1/support for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

/// Averaged precision/recall/F1 over all classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

/// Per-class and averaged metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// One entry per label in [`Label::ALL`] order
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = Label::ALL
            .iter()
            .map(|&label| {
                let tp = matrix.true_positives(label);
                let precision = ratio(tp, matrix.predicted_total(label));
                let recall = ratio(tp, matrix.actual_total(label));
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1: f1_score(precision, recall),
                    support: matrix.actual_total(label),
                }
            })
            .collect();

        let total = matrix.total();
        let n = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            support: total,
        };

        let weighted = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Self {
            accuracy: ratio(matrix.correct(), total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics for a single class
    pub fn class(&self, label: Label) -> &ClassMetrics {
        &self.classes[label.index()]
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Fixed-width text layout modelled on scikit-learn's `classification_report`
impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = "weighted avg".len();
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.prec$} {:>9.prec$} {:>9.prec$} {:>9}",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support,
                prec = DIGITS
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.prec$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            prec = DIGITS
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.prec$} {:>9.prec$} {:>9.prec$} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1,
                avg.support,
                prec = DIGITS
            )?;
        }
        Ok(())
    }
}

/// Compute the confusion matrix and classification report.
///
/// # Errors
///
/// [`Error::InvalidInput`] when either sequence is empty or their lengths
/// differ. Inputs are never truncated or padded.
///
/// # Examples
///
/// ```
/// use rsm_common::metrics::compute_metrics;
/// use rsm_common::Label::*;
///
/// let (matrix, report) = compute_metrics(
///     &[Negative, Neutral, Positive, Positive],
///     &[Negative, Neutral, Neutral, Positive],
/// ).unwrap();
/// assert_eq!(matrix.total(), 4);
/// assert_eq!(matrix.get(Positive, Neutral), 1);
/// assert!((report.accuracy - 0.75).abs() < 1e-12);
/// ```
pub fn compute_metrics(
    true_labels: &[Label],
    predicted_labels: &[Label],
) -> Result<(ConfusionMatrix, ClassificationReport)> {
    let matrix = ConfusionMatrix::from_labels(true_labels, predicted_labels)?;
    let report = ClassificationReport::from_matrix(&matrix);
    Ok((matrix, report))
}

/// Locations of the two evaluation artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationArtifacts {
    pub confusion_matrix: PathBuf,
    pub classification_report: PathBuf,
}

impl EvaluationArtifacts {
    /// Artifacts under the well-known names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            confusion_matrix: dir.join(CONFUSION_MATRIX_FILE),
            classification_report: dir.join(CLASSIFICATION_REPORT_FILE),
        }
    }

    /// Overwrite both artifacts.
    ///
    /// Both documents are rendered and staged before either target is
    /// replaced. If the second replacement fails the first is rolled back, so
    /// the pair on disk always comes from the same run.
    pub fn write(&self, matrix: &ConfusionMatrix, report: &ClassificationReport) -> Result<()> {
        let matrix_csv = matrix.to_csv()?;
        let report_text = report.to_string();

        commit_all(vec![
            stage_bytes(&self.confusion_matrix, &matrix_csv)?,
            stage_bytes(&self.classification_report, report_text.as_bytes())?,
        ])?;

        info!(
            "Wrote {} and {}",
            self.confusion_matrix.display(),
            self.classification_report.display()
        );
        Ok(())
    }
}
