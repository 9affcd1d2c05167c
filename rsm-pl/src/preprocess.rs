//! Preprocess stage: raw snapshot -> `processed/clean.parquet`
//!
//! Cleans text, drops rows whose cleaned text is empty, keeps the first row
//! of each `review_id` and attaches the star-derived proxy label. A star
//! rating outside 1..=5 fails the whole stage.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{info, warn};

use rsm_common::config::DataPaths;
use rsm_common::review::{LabeledReview, RawReview, Review};
use rsm_common::snapshot::{latest_parquet, read_raw_reviews, write_labeled_reviews};

use crate::error::{PipelineError, Result};

/// Rows kept and dropped by [`preprocess`]
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub reviews: Vec<LabeledReview>,
    pub dropped_empty: usize,
    pub dropped_duplicates: usize,
}

pub fn preprocess(raw: &[RawReview]) -> Result<Preprocessed> {
    let mut seen = HashSet::new();
    let mut out = Preprocessed {
        reviews: Vec::with_capacity(raw.len()),
        dropped_empty: 0,
        dropped_duplicates: 0,
    };

    for record in raw {
        let review = Review::from_raw(record);
        if review.text_clean.is_empty() {
            out.dropped_empty += 1;
            continue;
        }
        if !seen.insert(review.review_id.clone()) {
            out.dropped_duplicates += 1;
            continue;
        }
        out.reviews.push(LabeledReview::from_review(review)?);
    }

    Ok(out)
}

/// Clean the latest raw snapshot into `processed/clean.parquet`
pub fn run_preprocess(paths: &DataPaths) -> Result<PathBuf> {
    let source = latest_parquet(&paths.raw_dir())
        .map_err(|e| PipelineError::from_missing(e, "raw snapshot"))?;
    let raw = read_raw_reviews(&source)?;
    let result = preprocess(&raw)?;

    if result.dropped_empty + result.dropped_duplicates > 0 {
        warn!(
            "Dropped {} empty and {} duplicate reviews from {}",
            result.dropped_empty,
            result.dropped_duplicates,
            source.display()
        );
    }

    paths.ensure_dirs()?;
    let target = paths.clean_snapshot();
    write_labeled_reviews(&target, &result.reviews)?;
    info!(
        "Saved {} | rows={} (from {})",
        target.display(),
        result.reviews.len(),
        source.display()
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsm_common::{Error, Label};

    fn raw(id: &str, stars: i64, text: &str) -> RawReview {
        RawReview {
            review_id: id.to_string(),
            business_id: "b".to_string(),
            restaurant_name: "Burger Station".to_string(),
            city: "Puebla".to_string(),
            stars,
            text: text.to_string(),
            created_at: "2026-10-16T00:00:00".to_string(),
        }
    }

    #[test]
    fn test_preprocess_cleans_and_labels() {
        let result = preprocess(&[raw("a", 2, "  muy   lento\n"), raw("b", 4, "rico")]).unwrap();
        assert_eq!(result.reviews.len(), 2);
        assert_eq!(result.reviews[0].review.text_clean, "muy lento");
        assert_eq!(result.reviews[0].review.text_raw, "  muy   lento\n");
        assert_eq!(result.reviews[0].label_proxy, Label::Negative);
        assert_eq!(result.reviews[1].label_proxy, Label::Positive);
        assert!(result.reviews.iter().all(|r| r.model_label.is_none()));
    }

    #[test]
    fn test_preprocess_drops_empty_and_duplicates() {
        let result = preprocess(&[
            raw("a", 3, "normal"),
            raw("b", 3, " \t\n"),
            raw("a", 5, "otra vez"),
            raw("c", 1, "frío"),
        ])
        .unwrap();

        let ids: Vec<&str> = result.reviews.iter().map(|r| r.review_id()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(result.reviews[0].review.text_clean, "normal");
        assert_eq!(result.dropped_empty, 1);
        assert_eq!(result.dropped_duplicates, 1);
    }

    #[test]
    fn test_preprocess_rejects_out_of_range_stars() {
        let result = preprocess(&[raw("a", 6, "demasiado bueno")]);
        assert!(matches!(
            result,
            Err(PipelineError::Common(Error::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_run_preprocess_without_raw_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let err = run_preprocess(&paths).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
        assert!(err.to_string().contains("run the pipeline first"));
    }
}
