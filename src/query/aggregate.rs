//! Read-time rollups over caller-chosen windows.
//!
//! This path is independent of the ingestion resample: it re-buckets stored
//! rows with its own window and reports several statistics per bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Channel, Channels, ProcessedReading};
use crate::pipeline::stats;
use crate::query::range::TimeRange;
use crate::window::Window;

// ---

/// Statistics of one channel within one bucket; all `None` for an empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rollup {
    // ---
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

impl Rollup {
    pub fn from_values(values: &[f64]) -> Self {
        Rollup {
            min: stats::min(values),
            max: stats::max(values),
            mean: stats::mean(values),
            median: stats::median(values),
        }
    }
}

/// One bucket of an aggregation, flattened to `<channel>_<stat>` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRow {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub temperature_mean: Option<f64>,
    pub temperature_median: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub humidity_mean: Option<f64>,
    pub humidity_median: Option<f64>,
    pub air_quality_min: Option<f64>,
    pub air_quality_max: Option<f64>,
    pub air_quality_mean: Option<f64>,
    pub air_quality_median: Option<f64>,
}

impl RollupRow {
    // ---
    pub fn new(timestamp: DateTime<Utc>, rollups: Channels<Rollup>) -> Self {
        let Channels {
            temperature: t,
            humidity: h,
            air_quality: a,
        } = rollups;

        RollupRow {
            timestamp,
            temperature_min: t.min,
            temperature_max: t.max,
            temperature_mean: t.mean,
            temperature_median: t.median,
            humidity_min: h.min,
            humidity_max: h.max,
            humidity_mean: h.mean,
            humidity_median: h.median,
            air_quality_min: a.min,
            air_quality_max: a.max,
            air_quality_mean: a.mean,
            air_quality_median: a.median,
        }
    }

    pub fn rollup(&self, channel: Channel) -> Rollup {
        match channel {
            Channel::Temperature => Rollup {
                min: self.temperature_min,
                max: self.temperature_max,
                mean: self.temperature_mean,
                median: self.temperature_median,
            },
            Channel::Humidity => Rollup {
                min: self.humidity_min,
                max: self.humidity_max,
                mean: self.humidity_mean,
                median: self.humidity_median,
            },
            Channel::AirQuality => Rollup {
                min: self.air_quality_min,
                max: self.air_quality_max,
                mean: self.air_quality_mean,
                median: self.air_quality_median,
            },
        }
    }
}

/// Re-bucket the rows of `series` inside `range` into `window`-wide buckets.
///
/// Every bucket between the first and last matching row is reported, empty
/// ones with `None` statistics. The window is already validated by the time
/// it gets here; parse it with `str::parse::<Window>()` to surface bad input.
/// A window too fine for the matching span is rejected rather than allocated.
pub fn aggregate(
    series: &[ProcessedReading],
    window: Window,
    range: &TimeRange,
) -> Result<Vec<RollupRow>> {
    // ---
    let rows = range.filter(series);
    let (Some(first), Some(last)) = (
        rows.iter().map(|r| r.timestamp).min(),
        rows.iter().map(|r| r.timestamp).max(),
    ) else {
        tracing::debug!("Aggregation found no rows in {:?}", range);
        return Ok(Vec::new());
    };

    let grid = window.grid(first, last)?;
    let origin = Window::grid_origin(first);
    let width = window.num_seconds();

    let mut members: Vec<Channels<Vec<f64>>> = vec![Channels::default(); grid.len()];
    for row in &rows {
        let start = window.bucket_start(origin, row.timestamp);
        let idx = ((start - grid[0]).num_seconds() / width) as usize;
        for channel in Channel::ALL {
            if let Some(v) = row.value(channel) {
                members[idx].get_mut(channel).push(v);
            }
        }
    }

    tracing::debug!(
        "Aggregated {} rows into {} buckets of {}",
        rows.len(),
        grid.len(),
        window
    );

    Ok(grid
        .into_iter()
        .zip(members)
        .map(|(timestamp, bucket)| {
            RollupRow::new(
                timestamp,
                Channels::from_fn(|c| Rollup::from_values(bucket.get(c))),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 0, 0, 0).unwrap()
    }

    fn row(offset_min: i64, temp: f64) -> ProcessedReading {
        ProcessedReading::new(
            t0() + Duration::minutes(offset_min),
            Channels {
                temperature: Some(temp),
                humidity: Some(temp * 2.0),
                air_quality: None,
            },
        )
    }

    #[test]
    fn test_rollup_statistics_per_bucket() {
        // ---
        let series = [row(0, 10.0), row(60, 30.0), row(120, 20.0), row(180, 50.0)];
        let out = aggregate(&series, "2h".parse().unwrap(), &TimeRange::unbounded()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, t0());
        assert_eq!(out[0].temperature_min, Some(10.0));
        assert_eq!(out[0].temperature_max, Some(30.0));
        assert_eq!(out[0].temperature_mean, Some(20.0));
        assert_eq!(out[0].temperature_median, Some(20.0));
        assert_eq!(out[1].humidity_mean, Some(70.0));
        assert_eq!(out[1].rollup(Channel::AirQuality), Rollup::default());
    }

    #[test]
    fn test_finer_window_reports_empty_buckets() {
        // ---
        let series = [row(0, 10.0), row(60, 30.0)];
        let out = aggregate(&series, "10min".parse().unwrap(), &TimeRange::unbounded()).unwrap();

        assert_eq!(out.len(), 7);
        assert_eq!(out[3].timestamp, t0() + Duration::minutes(30));
        assert_eq!(out[3].rollup(Channel::Temperature), Rollup::default());
        assert_eq!(out[6].temperature_median, Some(30.0));
    }

    #[test]
    fn test_range_is_applied_before_bucketing() {
        // ---
        let series = [row(0, 10.0), row(60, 30.0), row(120, 20.0)];
        let range = TimeRange::new(Some(t0() + Duration::minutes(30)), None).unwrap();
        let out = aggregate(&series, "1h".parse().unwrap(), &range).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, t0() + Duration::hours(1));
        assert_eq!(out[0].temperature_max, Some(30.0));
    }

    #[test]
    fn test_empty_input() {
        // ---
        assert!(aggregate(&[], Window::one_hour(), &TimeRange::unbounded())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        // ---
        assert!("100000000d".parse::<Window>().is_err());

        let widest: Window = "24855d".parse().unwrap();
        let out = aggregate(&[row(0, 10.0)], widest, &TimeRange::unbounded()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, t0());
        assert_eq!(out[0].temperature_mean, Some(10.0));
    }

    #[test]
    fn test_too_fine_window_is_rejected() {
        // ---
        let series = [row(0, 10.0), row(60 * 24 * 365, 20.0)];
        let err = aggregate(&series, "1s".parse().unwrap(), &TimeRange::unbounded()).unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::TooManyBuckets { .. }));
    }
}
