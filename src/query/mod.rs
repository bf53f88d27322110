//! Read-time queries over already processed rows.
//!
//! These run per request against whatever the caller loaded from storage and
//! never feed back into the ingestion pipeline.

pub mod aggregate;
pub mod comparison;
pub mod projection;
pub mod range;

pub use aggregate::{aggregate, Rollup, RollupRow};
pub use comparison::{compare_last_7_days, DaySeries, HourPoint};
pub use projection::{project, ProcessedQuery, ProjectedReading};
pub use range::TimeRange;

use crate::models::{Channels, ProcessedReading};
use crate::pipeline::{summarize_rows, ChannelSummary};

/// Per-channel min / max / mean over the rows inside `range`.
pub fn summary_statistics(
    series: &[ProcessedReading],
    range: &TimeRange,
) -> Channels<ChannelSummary> {
    summarize_rows(range.filter(series))
}
