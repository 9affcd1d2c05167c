//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC calendar date
pub fn today_utc() -> NaiveDate {
    now().date_naive()
}

/// Compact sortable stamp used in snapshot file names (`YYYYmmdd_HHMMSS`)
pub fn snapshot_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}
