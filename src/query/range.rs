//! Inclusive time-range filter for read-time queries.

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, Result};
use crate::models::ProcessedReading;

// ---

/// `[start, end]` with either bound optional. An inverted range cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    // ---
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(PipelineError::InvertedRange { start, end });
            }
        }
        Ok(TimeRange { start, end })
    }

    pub fn unbounded() -> Self {
        TimeRange::default()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }

    /// Rows of `series` inside the range, in their original order.
    pub fn filter<'a>(&self, series: &'a [ProcessedReading]) -> Vec<&'a ProcessedReading> {
        series.iter().filter(|r| self.contains(r.timestamp)).collect()
    }
}
