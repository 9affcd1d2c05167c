//! Append-only feedback log of human label corrections
//!
//! The log is a CSV file with a fixed five-column header:
//!
//! ```text
//! review_id,text_clean,model_label,user_label,timestamp_utc
//! ```
//!
//! Rows are only ever appended. A review corrected several times appears
//! several times; consumers that need the current label take the last row
//! for each review ([`latest_corrections`]).
//!
//! Each append is one `write_all` of a fully serialized row on a handle opened
//! in append mode. There is no locking between processes: concurrent writers
//! may interleave rows but never rewrite earlier ones.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Label, Result};

/// File name of the feedback log
pub const FEEDBACK_FILE: &str = "feedback.csv";

/// Header of the feedback log, in column order
pub const FEEDBACK_COLUMNS: [&str; 5] = [
    "review_id",
    "text_clean",
    "model_label",
    "user_label",
    "timestamp_utc",
];

/// One human correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub review_id: String,
    pub text_clean: String,
    /// Label the model had assigned; empty field when the row had no prediction
    pub model_label: Option<Label>,
    pub user_label: Label,
    /// ISO-8601 UTC, microsecond precision
    pub timestamp_utc: DateTime<Utc>,
}

/// Feedback log at a fixed path
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    path: PathBuf,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log with its header if it does not exist yet.
    ///
    /// Safe to call on every startup. An existing non-empty file is never
    /// touched; an existing zero-length file receives the header.
    pub fn ensure_store(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let header = header_bytes()?;
        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(mut file) => {
                file.write_all(&header)?;
                info!("Created feedback log: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if fs::metadata(&self.path)?.len() == 0 {
                    let mut file = OpenOptions::new().append(true).open(&self.path)?;
                    file.write_all(&header)?;
                    debug!("Wrote header into empty feedback log: {}", self.path.display());
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append one correction stamped with the current UTC time.
    ///
    /// Returns the record exactly as persisted.
    pub fn append_feedback(
        &self,
        review_id: &str,
        text_clean: &str,
        model_label: Option<Label>,
        user_label: Label,
    ) -> Result<FeedbackRecord> {
        let record = FeedbackRecord {
            review_id: review_id.to_string(),
            text_clean: text_clean.to_string(),
            model_label,
            user_label,
            timestamp_utc: Utc::now().trunc_subsecs(6),
        };
        self.append_record(&record)?;
        Ok(record)
    }

    /// Append an already-built record
    pub fn append_record(&self, record: &FeedbackRecord) -> Result<()> {
        self.ensure_store()?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(record)?;
        let row = writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("serializing feedback row: {}", e)))?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&row)?;

        info!(
            "Feedback recorded: review {} {} -> {}",
            record.review_id,
            record.model_label.map(|l| l.as_str()).unwrap_or("-"),
            record.user_label
        );
        Ok(())
    }

    /// Read the whole log in append order.
    ///
    /// A missing, empty or malformed log reads as no feedback; problems are
    /// logged, never returned.
    pub fn load_feedback(&self) -> Vec<FeedbackRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    "Ignoring unreadable feedback log {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<FeedbackRecord>> {
        if fs::metadata(&self.path)?.len() == 0 {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?;
        if !headers.iter().eq(FEEDBACK_COLUMNS.iter().copied()) {
            return Err(Error::Schema(format!(
                "feedback header {:?} does not match {:?}",
                headers, FEEDBACK_COLUMNS
            )));
        }

        reader
            .deserialize::<FeedbackRecord>()
            .map(|row| row.map_err(Error::from))
            .collect()
    }
}

fn header_bytes() -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FEEDBACK_COLUMNS)?;
    writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("serializing feedback header: {}", e)))
}

/// Current corrected label per review (last write wins)
pub fn latest_corrections(records: &[FeedbackRecord]) -> HashMap<String, Label> {
    records
        .iter()
        .map(|r| (r.review_id.clone(), r.user_label))
        .collect()
}

/// Feedback volume counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackSummary {
    pub total: usize,
    /// Records whose timestamp falls on `today` (UTC)
    pub today: usize,
}

impl FeedbackSummary {
    pub fn from_records(records: &[FeedbackRecord], today: NaiveDate) -> Self {
        Self {
            total: records.len(),
            today: records
                .iter()
                .filter(|r| r.timestamp_utc.date_naive() == today)
                .count(),
        }
    }
}
