//! End-to-end tests of the label / evaluation / feedback loop on disk
//!
//! Covers:
//! - Clean snapshot -> predictions snapshot -> metrics artifacts
//! - Feedback log append/load round trip and append-only growth
//! - Latest raw snapshot resolution by modification time

use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use rsm_common::config::DataPaths;
use rsm_common::feedback::{latest_corrections, FeedbackStore};
use rsm_common::metrics::{compute_metrics, ConfusionMatrix};
use rsm_common::review::{LabeledReview, RawReview, Review};
use rsm_common::snapshot::{
    latest_parquet, read_label_columns, read_labeled_reviews, read_raw_reviews,
    write_labeled_reviews, write_raw_reviews,
};
use rsm_common::{parse_label, Label};
use tempfile::TempDir;

fn raw(id: &str, stars: i64, text: &str) -> RawReview {
    RawReview {
        review_id: id.to_string(),
        business_id: format!("biz-{}", id),
        restaurant_name: "Café Aurora".to_string(),
        city: "Querétaro".to_string(),
        stars,
        text: text.to_string(),
        created_at: "2026-10-16T10:00:00".to_string(),
    }
}

fn set_mtime(path: &std::path::Path, at: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(at)
        .unwrap();
}

#[test]
fn test_predictions_snapshot_to_artifacts() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure_dirs().unwrap();

    let completions = [
        (raw("a", 1, "Horrible  servicio"), "NEGATIVE"),
        (raw("b", 3, "Normal\n\tnada especial"), "Sentiment: neutral"),
        (raw("c", 5, "  Muy rico "), "neutral."),
        (raw("d", 4, "Excelente"), "positive!!!"),
    ];
    let labeled: Vec<LabeledReview> = completions
        .iter()
        .map(|(r, completion)| {
            LabeledReview::from_review(Review::from_raw(r))
                .unwrap()
                .with_prediction(parse_label(Some(completion)))
        })
        .collect();
    write_labeled_reviews(&paths.predictions_snapshot(), &labeled).unwrap();

    let back = read_labeled_reviews(&paths.predictions_snapshot()).unwrap();
    assert_eq!(back, labeled);
    assert_eq!(back[1].review.text_clean, "Normal nada especial");

    let (truth, predicted) = read_label_columns(&paths.predictions_snapshot())
        .unwrap()
        .defined_pairs();
    let (matrix, report) = compute_metrics(&truth, &predicted).unwrap();
    let artifacts = paths.evaluation_artifacts();
    artifacts.write(&matrix, &report).unwrap();

    let reread = ConfusionMatrix::read_csv(&artifacts.confusion_matrix).unwrap();
    assert_eq!(reread, matrix);
    assert_eq!(reread.get(Label::Positive, Label::Neutral), 1);
    assert_eq!(reread.total(), 4);

    let text = fs::read_to_string(&artifacts.classification_report).unwrap();
    assert!(text.contains("accuracy"));
    assert!(text.contains("0.7500"));
}

#[test]
fn test_clean_snapshot_has_no_defined_pairs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clean.parquet");
    let labeled = vec![LabeledReview::from_review(Review::from_raw(&raw("a", 2, "x"))).unwrap()];
    write_labeled_reviews(&path, &labeled).unwrap();

    let (truth, predicted) = read_label_columns(&path).unwrap().defined_pairs();
    assert!(truth.is_empty());
    assert!(compute_metrics(&truth, &predicted).is_err());
}

#[test]
fn test_feedback_log_grows_by_one_per_append() {
    let dir = TempDir::new().unwrap();
    let store = FeedbackStore::new(DataPaths::new(dir.path()).feedback_log());
    store.ensure_store().unwrap();

    let mut expected = Vec::new();
    for (i, user_label) in [Label::Negative, Label::Positive, Label::Neutral]
        .into_iter()
        .enumerate()
    {
        let before = fs::read(store.path()).unwrap();
        let record = store
            .append_feedback("r-1", "sabroso, pero \"caro\"", Some(Label::Neutral), user_label)
            .unwrap();
        expected.push(record);

        let after = fs::read(store.path()).unwrap();
        assert!(after.starts_with(&before), "append {} rewrote earlier rows", i);
        assert_eq!(store.load_feedback(), expected);
    }

    assert_eq!(latest_corrections(&expected)["r-1"], Label::Neutral);
}

#[test]
fn test_latest_raw_snapshot_wins() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure_dirs().unwrap();

    let older = paths.raw_dir().join("reviews_20261015_080000.parquet");
    let newer = paths.raw_dir().join("reviews_20261016_080000.parquet");
    write_raw_reviews(&older, &[raw("old", 1, "x")]).unwrap();
    write_raw_reviews(&newer, &[raw("new", 5, "y")]).unwrap();
    fs::write(paths.raw_dir().join("notes.txt"), "ignored").unwrap();

    let base = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&older, base);
    set_mtime(&newer, base + Duration::from_secs(60));

    let latest = latest_parquet(&paths.raw_dir()).unwrap();
    assert_eq!(latest, newer);
    assert_eq!(latest_parquet(&paths.raw_dir()).unwrap(), latest);
    assert_eq!(read_raw_reviews(&latest).unwrap()[0].review_id, "new");

    // Touching the older file makes it current again
    set_mtime(&older, base + Duration::from_secs(120));
    assert_eq!(latest_parquet(&paths.raw_dir()).unwrap(), older);
}
