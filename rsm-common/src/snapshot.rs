//! Parquet dataset snapshots
//!
//! Three kinds of snapshot flow through the pipeline:
//! - raw: `raw/reviews_<YYYYmmdd_HHMMSS>.parquet`, one per fetch, holding
//!   [`RawReview`] rows exactly as served by the simulator
//! - clean: `processed/clean.parquet`, [`LabeledReview`] rows without
//!   predictions
//! - predictions: `processed/predictions.parquet`, [`LabeledReview`] rows
//!   with `model_label`
//!
//! Readers validate column names and types at this boundary and hand out
//! typed records. Optional columns (`text_raw`, `label_proxy`,
//! `model_label`) may be missing; `label_proxy` is then derived from `stars`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arrow_array::{
    Array, ArrayRef, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    LargeStringArray, RecordBatch, StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::review::{LabeledReview, RawReview, Review};
use crate::{stars_to_label, Error, Label, Result};

/// Snapshot file extension
pub const SNAPSHOT_EXTENSION: &str = "parquet";

/// Columns every labeled dataset must provide
pub const REQUIRED_DATASET_COLUMNS: [&str; 5] =
    ["review_id", "restaurant_name", "city", "stars", "text_clean"];

/// File name for a raw snapshot taken at `at`
pub fn raw_snapshot_name(at: DateTime<Utc>) -> String {
    format!(
        "reviews_{}.{}",
        crate::time::snapshot_stamp(at),
        SNAPSHOT_EXTENSION
    )
}

/// Most recently modified `*.parquet` file in `dir`.
///
/// Ties on modification time go to the greater file name, so the result is
/// stable across calls on an unchanged directory.
///
/// # Errors
///
/// [`Error::NotFound`] if the directory does not exist or holds no snapshot.
pub fn latest_parquet(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            Error::NotFound(format!("snapshot directory {} does not exist", dir.display()))
        }
        _ => Error::Io(e),
    })?;

    let mut candidates: Vec<(SystemTime, OsString, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !is_snapshot(&path) {
            continue;
        }
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            continue;
        }
        candidates.push((metadata.modified()?, entry.file_name(), path));
    }

    candidates
        .into_iter()
        .max_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)))
        .map(|(_, _, path)| path)
        .ok_or_else(|| {
            Error::NotFound(format!("no .{} snapshot in {}", SNAPSHOT_EXTENSION, dir.display()))
        })
}

fn is_snapshot(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
        .unwrap_or(false)
}

// ========================================
// Writing
// ========================================

fn write_batch(path: &Path, schema: SchemaRef, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    write_atomic(path, |file| {
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    })?;
    debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

fn utf8(name: &str, nullable: bool) -> Field {
    Field::new(name, DataType::Utf8, nullable)
}

fn string_array<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

/// Write simulator records as a raw snapshot
pub fn write_raw_reviews(path: &Path, reviews: &[RawReview]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        utf8("review_id", false),
        utf8("business_id", false),
        utf8("restaurant_name", false),
        utf8("city", false),
        Field::new("stars", DataType::Int64, false),
        utf8("text", false),
        utf8("created_at", false),
    ]));
    let columns = vec![
        string_array(reviews.iter().map(|r| r.review_id.as_str())),
        string_array(reviews.iter().map(|r| r.business_id.as_str())),
        string_array(reviews.iter().map(|r| r.restaurant_name.as_str())),
        string_array(reviews.iter().map(|r| r.city.as_str())),
        Arc::new(Int64Array::from_iter_values(reviews.iter().map(|r| r.stars))) as ArrayRef,
        string_array(reviews.iter().map(|r| r.text.as_str())),
        string_array(reviews.iter().map(|r| r.created_at.as_str())),
    ];
    write_batch(path, schema, columns)
}

/// Write labeled reviews (clean or predictions snapshot)
pub fn write_labeled_reviews(path: &Path, reviews: &[LabeledReview]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        utf8("review_id", false),
        utf8("restaurant_name", false),
        utf8("city", false),
        Field::new("stars", DataType::Int64, false),
        utf8("text_raw", false),
        utf8("text_clean", false),
        utf8("label_proxy", false),
        utf8("model_label", true),
    ]));
    let model_labels: Vec<Option<&str>> = reviews
        .iter()
        .map(|r| r.model_label.map(|l| l.as_str()))
        .collect();
    let columns = vec![
        string_array(reviews.iter().map(|r| r.review.review_id.as_str())),
        string_array(reviews.iter().map(|r| r.review.restaurant_name.as_str())),
        string_array(reviews.iter().map(|r| r.review.city.as_str())),
        Arc::new(Int64Array::from_iter_values(reviews.iter().map(|r| r.review.stars))) as ArrayRef,
        string_array(reviews.iter().map(|r| r.review.text_raw.as_str())),
        string_array(reviews.iter().map(|r| r.review.text_clean.as_str())),
        string_array(reviews.iter().map(|r| r.label_proxy.as_str())),
        Arc::new(StringArray::from(model_labels)) as ArrayRef,
    ];
    write_batch(path, schema, columns)
}

// ========================================
// Reading
// ========================================

/// Decoded record batches of one Parquet file
struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    source: PathBuf,
}

impl Table {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let batches = builder
            .build()?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            schema,
            batches,
            source: path.to_path_buf(),
        })
    }

    fn has(&self, name: &str) -> bool {
        self.schema.field_with_name(name).is_ok()
    }

    fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names.iter().copied().filter(|n| !self.has(n)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Schema(format!(
                "{} is missing columns {:?}",
                self.source.display(),
                missing
            )))
        }
    }

    fn column<'a>(&'a self, batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
        batch.column_by_name(name).ok_or_else(|| {
            Error::Schema(format!("{} has no column {}", self.source.display(), name))
        })
    }

    /// Nullable string column
    fn strings(&self, name: &str) -> Result<Vec<Option<String>>> {
        let mut out = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let column = self.column(batch, name)?;
            if let Some(array) = column.as_any().downcast_ref::<StringArray>() {
                out.extend(array.iter().map(|v| v.map(str::to_string)));
            } else if let Some(array) = column.as_any().downcast_ref::<LargeStringArray>() {
                out.extend(array.iter().map(|v| v.map(str::to_string)));
            } else if column.data_type() == &DataType::Null {
                // All-null column written without a value type
                out.extend(std::iter::repeat(None).take(column.len()));
            } else {
                return Err(self.type_error(name, column.data_type(), "string"));
            }
        }
        Ok(out)
    }

    /// Nullable integer column; whole-valued floats are accepted
    fn integers(&self, name: &str) -> Result<Vec<Option<i64>>> {
        let mut out = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let column = self.column(batch, name)?;
            let any = column.as_any();
            if let Some(array) = any.downcast_ref::<Int64Array>() {
                out.extend(array.iter());
            } else if let Some(array) = any.downcast_ref::<Int32Array>() {
                out.extend(array.iter().map(|v| v.map(i64::from)));
            } else if let Some(array) = any.downcast_ref::<Int16Array>() {
                out.extend(array.iter().map(|v| v.map(i64::from)));
            } else if let Some(array) = any.downcast_ref::<Int8Array>() {
                out.extend(array.iter().map(|v| v.map(i64::from)));
            } else if let Some(array) = any.downcast_ref::<Float64Array>() {
                for value in array.iter() {
                    match value {
                        Some(v) if v.fract() == 0.0 => out.push(Some(v as i64)),
                        Some(v) => {
                            return Err(Error::Schema(format!(
                                "{}: column {} holds non-integer value {}",
                                self.source.display(),
                                name,
                                v
                            )))
                        }
                        None => out.push(None),
                    }
                }
            } else {
                return Err(self.type_error(name, column.data_type(), "integer"));
            }
        }
        Ok(out)
    }

    /// Non-null string column
    fn required_strings(&self, name: &str) -> Result<Vec<String>> {
        self.strings(name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| self.null_error(name, row)))
            .collect()
    }

    /// Non-null integer column
    fn required_integers(&self, name: &str) -> Result<Vec<i64>> {
        self.integers(name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| self.null_error(name, row)))
            .collect()
    }

    /// Strictly canonical label column; nulls stay `None`
    fn labels(&self, name: &str) -> Result<Vec<Option<Label>>> {
        self.strings(name)?
            .into_iter()
            .map(|v| v.map(|s| s.parse::<Label>()).transpose())
            .collect()
    }

    fn type_error(&self, name: &str, actual: &DataType, expected: &str) -> Error {
        Error::Schema(format!(
            "{}: column {} has type {:?}, expected {}",
            self.source.display(),
            name,
            actual,
            expected
        ))
    }

    fn null_error(&self, name: &str, row: usize) -> Error {
        Error::Schema(format!(
            "{}: column {} is null at row {}",
            self.source.display(),
            name,
            row
        ))
    }

    /// Proxy labels from `label_proxy`, or derived from `stars` when that
    /// column is absent
    fn proxy_labels(&self) -> Result<Vec<Label>> {
        if self.has("label_proxy") {
            self.labels("label_proxy")?
                .into_iter()
                .enumerate()
                .map(|(row, v)| v.ok_or_else(|| self.null_error("label_proxy", row)))
                .collect()
        } else if self.has("stars") {
            self.required_integers("stars")?
                .into_iter()
                .map(stars_to_label)
                .collect()
        } else {
            Err(Error::Schema(format!(
                "{} has neither label_proxy nor stars",
                self.source.display()
            )))
        }
    }

    /// Model labels; all `None` when the column is absent
    fn model_labels(&self) -> Result<Vec<Option<Label>>> {
        if self.has("model_label") {
            self.labels("model_label")
        } else {
            Ok(vec![None; self.num_rows()])
        }
    }
}

/// Read a raw snapshot
pub fn read_raw_reviews(path: &Path) -> Result<Vec<RawReview>> {
    let table = Table::open(path)?;
    table.require(&[
        "review_id",
        "business_id",
        "restaurant_name",
        "city",
        "stars",
        "text",
        "created_at",
    ])?;

    let review_ids = table.required_strings("review_id")?;
    let business_ids = table.required_strings("business_id")?;
    let names = table.required_strings("restaurant_name")?;
    let cities = table.required_strings("city")?;
    let stars = table.required_integers("stars")?;
    let texts = table.strings("text")?;
    let created = table.required_strings("created_at")?;

    let mut reviews = Vec::with_capacity(review_ids.len());
    for i in 0..review_ids.len() {
        reviews.push(RawReview {
            review_id: review_ids[i].clone(),
            business_id: business_ids[i].clone(),
            restaurant_name: names[i].clone(),
            city: cities[i].clone(),
            stars: stars[i],
            text: texts[i].clone().unwrap_or_default(),
            created_at: created[i].clone(),
        });
    }
    Ok(reviews)
}

/// Read a clean or predictions snapshot into typed records.
///
/// Requires [`REQUIRED_DATASET_COLUMNS`]. Missing `text_raw` falls back to
/// `text_clean`; missing `model_label` means no predictions.
pub fn read_labeled_reviews(path: &Path) -> Result<Vec<LabeledReview>> {
    let table = Table::open(path)?;
    table.require(&REQUIRED_DATASET_COLUMNS)?;

    let review_ids = table.required_strings("review_id")?;
    let names = table.strings("restaurant_name")?;
    let cities = table.strings("city")?;
    let stars = table.required_integers("stars")?;
    let text_clean = table.strings("text_clean")?;
    let text_raw = if table.has("text_raw") {
        table.strings("text_raw")?
    } else {
        text_clean.clone()
    };
    let proxies = table.proxy_labels()?;
    let models = table.model_labels()?;

    let mut reviews = Vec::with_capacity(review_ids.len());
    for (i, review_id) in review_ids.into_iter().enumerate() {
        let clean = text_clean[i].clone().unwrap_or_default();
        reviews.push(LabeledReview {
            review: Review {
                review_id,
                restaurant_name: names[i].clone().unwrap_or_default(),
                city: cities[i].clone().unwrap_or_default(),
                stars: stars[i],
                text_raw: text_raw[i].clone().unwrap_or_else(|| clean.clone()),
                text_clean: clean,
            },
            label_proxy: proxies[i],
            model_label: models[i],
        });
    }
    Ok(reviews)
}

/// Proxy and predicted labels of every row, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelColumns {
    pub label_proxy: Vec<Label>,
    pub model_label: Vec<Option<Label>>,
}

impl LabelColumns {
    /// Rows where both labels are defined, as parallel sequences
    pub fn defined_pairs(&self) -> (Vec<Label>, Vec<Label>) {
        self.label_proxy
            .iter()
            .zip(&self.model_label)
            .filter_map(|(proxy, model)| model.map(|m| (*proxy, m)))
            .unzip()
    }
}

/// Read only the label columns of a dataset (all that evaluation needs)
pub fn read_label_columns(path: &Path) -> Result<LabelColumns> {
    let table = Table::open(path)?;
    Ok(LabelColumns {
        label_proxy: table.proxy_labels()?,
        model_label: table.model_labels()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_raw_snapshot_name() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(raw_snapshot_name(at), "reviews_20260307_090501.parquet");
    }

    #[test]
    fn test_is_snapshot_extension() {
        assert!(is_snapshot(Path::new("a.parquet")));
        assert!(is_snapshot(Path::new("dir/B.PARQUET")));
        assert!(!is_snapshot(Path::new("a.csv")));
        assert!(!is_snapshot(Path::new("parquet")));
    }

    fn touch(path: &Path, at: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    fn label_array(values: &[Option<&str>]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    #[test]
    fn test_latest_parquet_tie_goes_to_greater_name() {
        let dir = TempDir::new().unwrap();
        let at = SystemTime::now() - std::time::Duration::from_secs(600);
        for name in ["b.parquet", "a.parquet"] {
            let path = dir.path().join(name);
            fs::write(&path, b"x").unwrap();
            touch(&path, at);
        }

        for _ in 0..5 {
            assert_eq!(latest_parquet(dir.path()).unwrap(), dir.path().join("b.parquet"));
        }
    }

    #[test]
    fn test_latest_parquet_missing_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = latest_parquet(&dir.path().join("raw"));
        assert!(matches!(result, Err(Error::NotFound(_))), "{:?}", result);
    }

    #[test]
    fn test_latest_parquet_without_snapshots_is_not_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.parquet")).unwrap();

        match latest_parquet(dir.path()) {
            Err(Error::NotFound(msg)) => assert!(msg.contains(".parquet")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_label_only_dataset_evaluates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("predictions.parquet");
        let schema = Arc::new(Schema::new(vec![
            utf8("label_proxy", false),
            utf8("model_label", true),
        ]));
        write_batch(
            &path,
            schema,
            vec![
                label_array(&[Some("negative"), Some("neutral"), Some("positive"), Some("positive")]),
                label_array(&[Some("negative"), Some("neutral"), Some("neutral"), Some("positive")]),
            ],
        )
        .unwrap();

        let (truth, predicted) = read_label_columns(&path).unwrap().defined_pairs();
        let (matrix, report) = crate::metrics::compute_metrics(&truth, &predicted).unwrap();
        assert_eq!(matrix.total(), 4);
        assert!((report.macro_avg.recall - 5.0 / 6.0).abs() < 1e-9);
        assert!((report.accuracy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_missing_proxy_column_is_derived_from_stars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.parquet");
        let schema = Arc::new(Schema::new(vec![
            utf8("review_id", false),
            utf8("restaurant_name", false),
            utf8("city", false),
            Field::new("stars", DataType::Int64, false),
            utf8("text_clean", false),
            utf8("model_label", true),
        ]));
        write_batch(
            &path,
            schema,
            vec![
                string_array(["r1", "r2", "r3"].into_iter()),
                string_array(["Sushi Nami"; 3].into_iter()),
                string_array(["Monterrey"; 3].into_iter()),
                Arc::new(Int64Array::from(vec![2, 3, 5])) as ArrayRef,
                string_array(["malo", "normal", "rico"].into_iter()),
                label_array(&[Some("negative"), None, Some("neutral")]),
            ],
        )
        .unwrap();

        let reviews = read_labeled_reviews(&path).unwrap();
        let proxies: Vec<Label> = reviews.iter().map(|r| r.label_proxy).collect();
        assert_eq!(proxies, vec![Label::Negative, Label::Neutral, Label::Positive]);
        assert_eq!(reviews[0].review.text_raw, "malo");
        assert_eq!(reviews[1].model_label, None);

        let columns = read_label_columns(&path).unwrap();
        assert_eq!(columns.label_proxy, proxies);
    }

    #[test]
    fn test_derived_proxy_rejects_out_of_range_stars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("stars", DataType::Int64, false),
            utf8("model_label", true),
        ]));
        write_batch(
            &path,
            schema,
            vec![
                Arc::new(Int64Array::from(vec![4, 9])) as ArrayRef,
                label_array(&[Some("positive"), Some("positive")]),
            ],
        )
        .unwrap();

        assert!(matches!(read_label_columns(&path), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_defined_pairs_skips_missing_predictions() {
        let columns = LabelColumns {
            label_proxy: vec![Label::Negative, Label::Neutral, Label::Positive],
            model_label: vec![Some(Label::Negative), None, Some(Label::Neutral)],
        };
        let (truth, predicted) = columns.defined_pairs();
        assert_eq!(truth, vec![Label::Negative, Label::Positive]);
        assert_eq!(predicted, vec![Label::Negative, Label::Neutral]);
    }
}
