//! Filtered, paginated view of processed rows with per-field projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Channel, ProcessedReading};
use crate::query::range::TimeRange;

// ---

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

/// What to select from the processed series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedQuery {
    // ---
    pub range: TimeRange,

    /// Channels to include; empty means all.
    pub metrics: Vec<Channel>,

    /// Include `*_smooth` values.
    pub smooth: bool,

    /// Include a channel only on rows where it is flagged.
    pub anomaly_only: bool,

    /// Return just the newest matching row.
    pub latest_only: bool,

    pub skip: usize,
    pub limit: usize,
}

impl Default for ProcessedQuery {
    fn default() -> Self {
        ProcessedQuery {
            range: TimeRange::unbounded(),
            metrics: Vec::new(),
            smooth: true,
            anomaly_only: false,
            latest_only: false,
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ProcessedQuery {
    fn selects(&self, channel: Channel) -> bool {
        self.metrics.is_empty() || self.metrics.contains(&channel)
    }
}

/// A projected row. Every field besides the timestamp is independently optional.
///
/// Value fields are doubly optional: the outer `None` means "not selected"
/// and is omitted from the output, `Some(None)` is a selected gap and
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProjectedReading {
    // ---
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_smooth: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_anomaly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_smooth: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_anomaly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality_smooth: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality_anomaly: Option<bool>,
}

impl ProjectedReading {
    // ---
    fn has_channels(&self) -> bool {
        self.temperature_anomaly.is_some()
            || self.humidity_anomaly.is_some()
            || self.air_quality_anomaly.is_some()
    }

    fn include(&mut self, row: &ProcessedReading, channel: Channel, smooth: bool) {
        let value = Some(row.value(channel));
        let smoothed = smooth.then(|| row.smooth(channel));
        let flag = Some(row.anomaly(channel));

        let (v, s, a) = match channel {
            Channel::Temperature => (
                &mut self.temperature,
                &mut self.temperature_smooth,
                &mut self.temperature_anomaly,
            ),
            Channel::Humidity => (
                &mut self.humidity,
                &mut self.humidity_smooth,
                &mut self.humidity_anomaly,
            ),
            Channel::AirQuality => (
                &mut self.air_quality,
                &mut self.air_quality_smooth,
                &mut self.air_quality_anomaly,
            ),
        };
        *v = value;
        *s = smoothed;
        *a = flag;
    }
}

/// Select, order, paginate and project rows of `series`.
///
/// Rows are taken in ascending time order after `skip`, up to `limit` (clamped
/// to `1..=MAX_LIMIT`), or only the newest row when `latest_only` is set.
/// Rows left without any channel after projection are dropped.
pub fn project(series: &[ProcessedReading], query: &ProcessedQuery) -> Vec<ProjectedReading> {
    // ---
    let mut rows = query.range.filter(series);
    rows.sort_by_key(|r| r.timestamp);

    let selected: Vec<&ProcessedReading> = if query.latest_only {
        rows.last().copied().into_iter().collect()
    } else {
        rows.into_iter()
            .skip(query.skip)
            .take(query.limit.clamp(1, MAX_LIMIT))
            .collect()
    };

    let projected: Vec<ProjectedReading> = selected
        .into_iter()
        .filter_map(|row| {
            let mut out = ProjectedReading {
                timestamp: row.timestamp,
                ..Default::default()
            };
            for channel in Channel::ALL {
                if query.selects(channel) && (!query.anomaly_only || row.anomaly(channel)) {
                    out.include(row, channel, query.smooth);
                }
            }
            out.has_channels().then_some(out)
        })
        .collect();

    tracing::debug!("Projected {} processed rows", projected.len());
    projected
}
