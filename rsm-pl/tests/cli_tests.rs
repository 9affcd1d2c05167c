//! Process-level tests for the rsm-pl exit-code contract
//!
//! - `metrics` on a small predictions snapshot writes both artifacts, exits 0
//! - `metrics` on a missing or empty dataset exits non-zero, writes nothing

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rsm_common::config::DataPaths;
use rsm_common::review::{LabeledReview, Review};
use rsm_common::snapshot::write_labeled_reviews;
use rsm_common::Label;
use tempfile::TempDir;

fn rsm_pl(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rsm-pl"))
        .args(args)
        .current_dir(workdir)
        .env_remove("RSM_DATA_ROOT")
        .env_remove("RSM_CONFIG")
        .env("XDG_CONFIG_HOME", workdir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Should run rsm-pl")
}

fn labeled(id: &str, stars: i64, model_label: Option<Label>) -> LabeledReview {
    let review = Review {
        review_id: id.to_string(),
        restaurant_name: "Pasta & Co.".to_string(),
        city: "Guadalajara".to_string(),
        stars,
        text_raw: "texto".to_string(),
        text_clean: "texto".to_string(),
    };
    LabeledReview {
        model_label,
        ..LabeledReview::from_review(review).unwrap()
    }
}

fn artifacts_exist(paths: &DataPaths) -> (bool, bool) {
    let artifacts = paths.evaluation_artifacts();
    (
        artifacts.confusion_matrix.exists(),
        artifacts.classification_report.exists(),
    )
}

#[test]
fn test_metrics_on_sample_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));
    paths.ensure_dirs().unwrap();

    // true = [neg, neu, pos, pos], predicted = [neg, neu, neu, pos]
    write_labeled_reviews(
        &paths.predictions_snapshot(),
        &[
            labeled("a", 1, Some(Label::Negative)),
            labeled("b", 3, Some(Label::Neutral)),
            labeled("c", 5, Some(Label::Neutral)),
            labeled("d", 4, Some(Label::Positive)),
        ],
    )
    .unwrap();

    let output = rsm_pl(dir.path(), &["metrics", "--data-root", "data"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(artifacts_exist(&paths), (true, true));

    let matrix = fs::read_to_string(paths.evaluation_artifacts().confusion_matrix).unwrap();
    assert_eq!(
        matrix,
        ",negative,neutral,positive\nnegative,1,0,0\nneutral,0,1,0\npositive,0,1,1\n"
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("accuracy"));
}

#[test]
fn test_metrics_without_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));

    let output = rsm_pl(dir.path(), &["metrics", "--data-root", "data"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("run the pipeline first"));
    assert_eq!(artifacts_exist(&paths), (false, false));
}

#[test]
fn test_metrics_on_empty_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));
    paths.ensure_dirs().unwrap();
    write_labeled_reviews(&paths.predictions_snapshot(), &[]).unwrap();

    let output = rsm_pl(dir.path(), &["metrics", "--data-root", "data"]);
    assert!(!output.status.success());
    assert_eq!(artifacts_exist(&paths), (false, false));
}

#[test]
fn test_metrics_without_predictions_fails() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));
    paths.ensure_dirs().unwrap();
    write_labeled_reviews(
        &paths.predictions_snapshot(),
        &[labeled("a", 1, None), labeled("b", 5, None)],
    )
    .unwrap();

    let output = rsm_pl(dir.path(), &["metrics", "--data-root", "data"]);
    assert!(!output.status.success());
    assert_eq!(artifacts_exist(&paths), (false, false));
}

#[test]
fn test_metrics_with_unwritable_report_leaves_no_matrix() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));
    paths.ensure_dirs().unwrap();
    write_labeled_reviews(
        &paths.predictions_snapshot(),
        &[labeled("a", 5, Some(Label::Positive))],
    )
    .unwrap();

    let report = paths.evaluation_artifacts().classification_report;
    fs::create_dir(&report).unwrap();
    fs::write(report.join("stale"), "x").unwrap();

    let output = rsm_pl(dir.path(), &["metrics", "--data-root", "data"]);
    assert!(!output.status.success());
    assert!(!paths.evaluation_artifacts().confusion_matrix.exists());
}

#[test]
fn test_data_root_from_environment() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path().join("elsewhere"));
    paths.ensure_dirs().unwrap();
    write_labeled_reviews(
        &paths.predictions_snapshot(),
        &[labeled("a", 2, Some(Label::Negative))],
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_rsm-pl"))
        .arg("metrics")
        .current_dir(dir.path())
        .env("RSM_DATA_ROOT", paths.root())
        .env_remove("RSM_CONFIG")
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(artifacts_exist(&paths), (true, true));
}

#[test]
fn test_preprocess_without_raw_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let output = rsm_pl(dir.path(), &["preprocess", "--data-root", "data"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("run the pipeline first"));
}
