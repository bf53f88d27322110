//! Day-over-day temperature comparison for the trailing seven days.
//!
//! Unlike [`aggregate`](crate::query::aggregate), this view does no bucketing:
//! every stored row inside the window becomes one `(hour, temperature)` point.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ProcessedReading;

// ---

pub const COMPARISON_DAYS: i64 = 7;

/// One point of a day's curve: hour of day and the temperature at that row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourPoint {
    pub x: u32,
    pub y: Option<f64>,
}

/// All points of one calendar day (UTC), keyed `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySeries {
    pub name: String,
    pub data: Vec<HourPoint>,
}

/// Group rows from `[now - 7 days, now]` by calendar day, points sorted by hour.
pub fn compare_last_7_days(series: &[ProcessedReading], now: DateTime<Utc>) -> Vec<DaySeries> {
    // ---
    let since = now - Duration::days(COMPARISON_DAYS);

    let mut rows: Vec<&ProcessedReading> = series
        .iter()
        .filter(|r| r.timestamp >= since && r.timestamp <= now)
        .collect();
    rows.sort_by_key(|r| r.timestamp);

    let mut days: BTreeMap<String, Vec<HourPoint>> = BTreeMap::new();
    for row in rows {
        days.entry(row.timestamp.format("%Y-%m-%d").to_string())
            .or_default()
            .push(HourPoint {
                x: row.timestamp.hour(),
                y: row.temperature,
            });
    }

    tracing::debug!("7-day comparison covers {} days", days.len());

    days.into_iter()
        .map(|(name, mut data)| {
            data.sort_by_key(|p| p.x);
            DaySeries { name, data }
        })
        .collect()
}
