//! Error types for the processing core.
//!
//! Malformed input rows are never errors (they are dropped by the validator);
//! only structurally invalid arguments reach this enum.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid window format: {0}")]
    InvalidWindow(String),

    #[error("Window {window} would produce {buckets} buckets (limit {limit})")]
    TooManyBuckets {
        window: String,
        buckets: i64,
        limit: i64,
    },

    #[error("end_time must be after start_time (start={start}, end={end})")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("end_date must not be before start_date (start={start}, end={end})")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Unreadable batch: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
