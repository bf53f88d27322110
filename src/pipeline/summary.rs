//! Descriptive statistics and the visualization-ready record set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::{Channel, Channels, ProcessedReading};
use crate::pipeline::stats;

// ---

/// Inclusive calendar-day span the summary covers. Both ends are `None` only
/// when there is no data to infer them from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    // ---
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Min / max / mean of one channel, rounded to two decimals. All `None` for no data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelSummary {
    // ---
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl ChannelSummary {
    pub fn from_values(values: &[f64]) -> Self {
        ChannelSummary {
            min: stats::min(values).map(stats::round2),
            max: stats::max(values).map(stats::round2),
            mean: stats::mean(values).map(stats::round2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.mean.is_none()
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSummary {
    // ---
    pub date_range: DateRange,
    pub summary: Channels<ChannelSummary>,
    pub graph_data: Vec<ProcessedReading>,
}

/// Per-channel statistics over the defined values of `rows`.
pub fn summarize_rows<'a, I>(rows: I) -> Channels<ChannelSummary>
where
    I: IntoIterator<Item = &'a ProcessedReading>,
{
    // ---
    let rows: Vec<&ProcessedReading> = rows.into_iter().collect();
    Channels::from_fn(|channel: Channel| {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.value(channel)).collect();
        ChannelSummary::from_values(&values)
    })
}

/// Filter `series` to the inclusive UTC date range and summarize it.
///
/// A missing bound defaults to the first / last date present in the series.
/// An empty result is not an error: statistics come back as `None`.
pub fn summarize(
    series: &[ProcessedReading],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<VisualSummary> {
    // ---
    let dates = series.iter().map(|r| r.timestamp.date_naive());
    let start_date = start_date.or_else(|| dates.clone().min());
    let end_date = end_date.or_else(|| dates.max());

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(PipelineError::InvertedDateRange { start, end });
        }
    }

    let in_range = |r: &&ProcessedReading| {
        let day = r.timestamp.date_naive();
        start_date.map_or(true, |s| day >= s) && end_date.map_or(true, |e| day <= e)
    };
    let graph_data: Vec<ProcessedReading> = series.iter().filter(in_range).cloned().collect();
    let summary = summarize_rows(&graph_data);

    tracing::debug!(
        "Summary over {:?}..={:?}: {} of {} rows",
        start_date,
        end_date,
        graph_data.len(),
        series.len()
    );

    Ok(VisualSummary {
        date_range: DateRange {
            start_date,
            end_date,
        },
        summary,
        graph_data,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn series() -> Vec<ProcessedReading> {
        // Three readings per day on Mar 25, 26, 27.
        let t0 = Utc.with_ymd_and_hms(2025, 3, 25, 0, 0, 0).unwrap();
        (0..9)
            .map(|i| {
                let v = i as f64;
                ProcessedReading::new(
                    t0 + Duration::hours(8 * i),
                    Channels {
                        temperature: Some(20.0 + v / 3.0),
                        humidity: Some(40.0 + v),
                        air_quality: Some(10.0 * v),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_defaults_to_full_span() {
        // ---
        let out = summarize(&series(), None, None).unwrap();

        assert_eq!(out.date_range.start_date, Some(day(25)));
        assert_eq!(out.date_range.end_date, Some(day(27)));
        assert_eq!(out.graph_data.len(), 9);
        assert_eq!(out.summary.humidity.min, Some(40.0));
        assert_eq!(out.summary.humidity.max, Some(48.0));
        assert_eq!(out.summary.humidity.mean, Some(44.0));
    }

    #[test]
    fn test_filters_inclusive_dates_and_rounds() {
        // ---
        let out = summarize(&series(), Some(day(26)), Some(day(26))).unwrap();

        assert_eq!(out.graph_data.len(), 3);
        // Temperatures 21.0, 21.333.., 21.666..
        assert_eq!(out.summary.temperature.min, Some(21.0));
        assert_eq!(out.summary.temperature.max, Some(21.67));
        assert_eq!(out.summary.temperature.mean, Some(21.33));
    }

    #[test]
    fn test_summary_matches_graph_data() {
        // ---
        let out = summarize(&series(), Some(day(25)), Some(day(26))).unwrap();
        let recomputed = summarize_rows(&out.graph_data);
        assert_eq!(out.summary, recomputed);
    }

    #[test]
    fn test_empty_range_yields_nulls() {
        // ---
        let out = summarize(&series(), Some(day(1)), Some(day(2))).unwrap();
        assert!(out.graph_data.is_empty());
        assert!(out.summary.temperature.is_empty());
        assert!(out.summary.air_quality.is_empty());
    }

    #[test]
    fn test_empty_series_yields_nulls() {
        // ---
        let out = summarize(&[], None, None).unwrap();
        assert_eq!(out.date_range, DateRange::default());
        assert!(out.graph_data.is_empty());
        assert!(out.summary.humidity.is_empty());

        let json = serde_json::to_value(&out).unwrap();
        assert!(json["summary"]["temperature"]["min"].is_null());
    }

    #[test]
    fn test_inverted_dates_rejected() {
        // ---
        let err = summarize(&series(), Some(day(27)), Some(day(25))).unwrap_err();
        assert!(matches!(err, PipelineError::InvertedDateRange { .. }));
    }
}
