//! Fixed-interval resampling with time-weighted gap filling.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Channel, Channels, Reading};
use crate::window::Window;

// ---

/// One grid point of the resampled series. `None` marks a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketRow {
    // ---
    pub timestamp: DateTime<Utc>,
    pub values: Channels<Option<f64>>,
}

/// Contiguous, ascending grid covering the batch's observed span.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSeries {
    // ---
    pub window: Window,
    pub rows: Vec<BucketRow>,
}

impl BucketedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Bucket readings into `window`-wide intervals, average each bucket, then
/// interpolate interior gaps along the time axis.
///
/// Buckets with no readings still produce a row, so the grid has no holes.
/// Gaps at either end have no neighbour on one side and stay `None`.
/// Fails only when the span needs more buckets than the grid allows.
pub fn resample(readings: &[Reading], window: Window) -> Result<BucketedSeries> {
    // ---
    let (Some(first), Some(last)) = (
        readings.iter().map(|r| r.timestamp).min(),
        readings.iter().map(|r| r.timestamp).max(),
    ) else {
        return Ok(BucketedSeries {
            window,
            rows: Vec::new(),
        });
    };

    let grid = window.grid(first, last)?;
    let origin = Window::grid_origin(first);
    let width = window.num_seconds();

    let mut sums = vec![Channels::<f64>::default(); grid.len()];
    let mut counts = vec![0usize; grid.len()];

    for reading in readings {
        let start = window.bucket_start(origin, reading.timestamp);
        let idx = ((start - grid[0]).num_seconds() / width) as usize;
        for channel in Channel::ALL {
            *sums[idx].get_mut(channel) += reading.value(channel);
        }
        counts[idx] += 1;
    }

    let mut rows: Vec<BucketRow> = grid
        .into_iter()
        .zip(sums.iter().zip(&counts))
        .map(|(timestamp, (sum, &count))| BucketRow {
            timestamp,
            values: Channels::from_fn(|c| (count > 0).then(|| sum.get(c) / count as f64)),
        })
        .collect();

    let empty = counts.iter().filter(|&&n| n == 0).count();
    tracing::debug!(
        "Resampled {} readings into {} buckets of {} ({} empty)",
        readings.len(),
        rows.len(),
        window,
        empty
    );

    for channel in Channel::ALL {
        interpolate_time(&mut rows, channel);
    }

    Ok(BucketedSeries { window, rows })
}

/// Fill interior `None`s of one channel by linear interpolation weighted by
/// elapsed time between the nearest known neighbours.
fn interpolate_time(rows: &mut [BucketRow], channel: Channel) {
    // ---
    let mut prev_known: Option<usize> = None;

    for idx in 0..rows.len() {
        if rows[idx].values.get(channel).is_none() {
            continue;
        }
        if let Some(prev) = prev_known {
            if idx > prev + 1 {
                fill_between(rows, channel, prev, idx);
            }
        }
        prev_known = Some(idx);
    }
}

fn fill_between(rows: &mut [BucketRow], channel: Channel, left: usize, right: usize) {
    // ---
    let (t0, v0) = (rows[left].timestamp, *rows[left].values.get(channel));
    let (t1, v1) = (rows[right].timestamp, *rows[right].values.get(channel));
    let (Some(v0), Some(v1)) = (v0, v1) else {
        return;
    };
    let span = (t1 - t0).num_milliseconds() as f64;

    for row in &mut rows[left + 1..right] {
        let elapsed = (row.timestamp - t0).num_milliseconds() as f64;
        *row.values.get_mut(channel) = Some(v0 + (v1 - v0) * elapsed / span);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 0, 0, 0).unwrap()
    }

    fn reading(offset_min: i64, temp: f64, hum: f64, aq: f64) -> Reading {
        Reading {
            timestamp: t0() + Duration::minutes(offset_min),
            temperature: temp,
            humidity: hum,
            air_quality: aq,
        }
    }

    #[test]
    fn test_gap_is_interpolated() {
        // ---
        let readings = [reading(0, 20.0, 50.0, 10.0), reading(120, 24.0, 52.0, 12.0)];
        let series = resample(&readings, Window::one_hour()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.rows[1].timestamp, t0() + Duration::hours(1));
        assert_eq!(series.rows[1].values.temperature, Some(22.0));
        assert_eq!(series.rows[1].values.humidity, Some(51.0));
        assert_eq!(series.rows[1].values.air_quality, Some(11.0));
    }

    #[test]
    fn test_buckets_average_members() {
        // ---
        let readings = [
            reading(70, 20.0, 40.0, 10.0),
            reading(5, 10.0, 30.0, 5.0),
            reading(65, 22.0, 44.0, 20.0),
            reading(59, 14.0, 34.0, 7.0),
        ];
        let series = resample(&readings, Window::one_hour()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.rows[0].values.temperature, Some(12.0));
        assert_eq!(series.rows[1].values.temperature, Some(21.0));
        assert_eq!(series.rows[1].values.humidity, Some(42.0));
        assert_eq!(series.rows[1].values.air_quality, Some(15.0));
    }

    #[test]
    fn test_grid_is_aligned_and_strictly_ascending() {
        // ---
        let readings = [
            reading(615, 20.0, 50.0, 10.0),
            reading(17, 21.0, 50.0, 10.0),
            reading(301, 19.0, 50.0, 10.0),
        ];
        let series = resample(&readings, "30min".parse().unwrap()).unwrap();

        assert_eq!(series.rows[0].timestamp, t0());
        for pair in series.rows.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(30));
        }
        assert_eq!(series.rows.last().unwrap().timestamp, t0() + Duration::minutes(600));
        assert!(series
            .rows
            .iter()
            .all(|r| r.values.temperature.is_some()));
    }

    #[test]
    fn test_interpolation_weights_by_time() {
        // ---
        let readings = [reading(0, 0.0, 0.0, 0.0), reading(240, 40.0, 80.0, 400.0)];
        let series = resample(&readings, Window::one_hour()).unwrap();

        let temps: Vec<_> = series.rows.iter().map(|r| r.values.temperature).collect();
        assert_eq!(
            temps,
            vec![Some(0.0), Some(10.0), Some(20.0), Some(30.0), Some(40.0)]
        );
    }

    #[test]
    fn test_edge_gaps_stay_undefined() {
        // ---
        let mut rows = vec![
            BucketRow {
                timestamp: t0(),
                values: Channels::default(),
            },
            BucketRow {
                timestamp: t0() + Duration::hours(1),
                values: Channels::from_fn(|_| Some(5.0)),
            },
            BucketRow {
                timestamp: t0() + Duration::hours(2),
                values: Channels::from_fn(|_| Some(7.0)),
            },
            BucketRow {
                timestamp: t0() + Duration::hours(3),
                values: Channels::default(),
            },
        ];
        interpolate_time(&mut rows, Channel::Temperature);

        assert_eq!(rows[0].values.temperature, None);
        assert_eq!(rows[3].values.temperature, None);
        assert_eq!(rows[1].values.temperature, Some(5.0));
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        // ---
        let series = resample(&[], Window::one_hour()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_oversized_grid_is_an_error() {
        // ---
        let readings = [reading(0, 20.0, 50.0, 10.0), reading(60 * 24 * 30, 21.0, 50.0, 10.0)];
        let err = resample(&readings, "1s".parse().unwrap()).unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::TooManyBuckets { .. }));
    }
}
