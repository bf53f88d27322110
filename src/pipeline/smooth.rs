//! Trailing moving average per channel.

use crate::models::{Channel, ProcessedReading};
use crate::pipeline::resample::BucketedSeries;

// ---

/// Number of grid points in the trailing smoothing window.
pub const SMOOTH_WINDOW: usize = 3;

/// Turn the resampled series into processed rows with `*_smooth` filled in.
///
/// Each smoothed value is the mean of the defined values among the current
/// point and up to `SMOOTH_WINDOW - 1` points before it (minimum period 1).
/// An undefined point smooths to `None`. Raw channel values pass through
/// untouched; anomaly flags start cleared.
pub fn smooth(series: &BucketedSeries) -> Vec<ProcessedReading> {
    // ---
    let mut rows: Vec<ProcessedReading> = series
        .rows
        .iter()
        .map(|row| ProcessedReading::new(row.timestamp, row.values))
        .collect();

    for channel in Channel::ALL {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value(channel)).collect();
        for (idx, row) in rows.iter_mut().enumerate() {
            row.set_smooth(channel, trailing_mean(&values, idx, SMOOTH_WINDOW));
        }
    }

    tracing::debug!("Smoothed {} rows (window {})", rows.len(), SMOOTH_WINDOW);
    rows
}

fn trailing_mean(values: &[Option<f64>], idx: usize, window: usize) -> Option<f64> {
    // ---
    if values[idx].is_none() {
        return None;
    }
    let start = (idx + 1).saturating_sub(window);
    let defined: Vec<f64> = values[start..=idx].iter().flatten().copied().collect();
    crate::pipeline::stats::mean(&defined)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Channels;
    use crate::pipeline::resample::BucketRow;
    use crate::window::Window;
    use chrono::{Duration, TimeZone, Utc};

    fn series(temps: &[Option<f64>]) -> BucketedSeries {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 26, 0, 0, 0).unwrap();
        BucketedSeries {
            window: Window::one_hour(),
            rows: temps
                .iter()
                .enumerate()
                .map(|(i, &t)| BucketRow {
                    timestamp: t0 + Duration::hours(i as i64),
                    values: Channels {
                        temperature: t,
                        humidity: Some(50.0),
                        air_quality: Some(10.0),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_minimum_period_one() {
        // ---
        let rows = smooth(&series(&[Some(3.0), Some(6.0), Some(9.0), Some(12.0)]));
        let smoothed: Vec<_> = rows.iter().map(|r| r.temperature_smooth).collect();

        assert_eq!(
            smoothed,
            vec![Some(3.0), Some(4.5), Some(6.0), Some(9.0)]
        );
    }

    #[test]
    fn test_raw_values_untouched() {
        // ---
        let rows = smooth(&series(&[Some(3.0), Some(6.0), Some(9.0)]));
        assert_eq!(rows[2].temperature, Some(9.0));
        assert_eq!(rows[2].humidity_smooth, Some(50.0));
        assert!(!rows[2].temperature_anomaly);
    }

    #[test]
    fn test_undefined_points_propagate() {
        // ---
        let rows = smooth(&series(&[None, Some(4.0), Some(8.0), None]));
        let smoothed: Vec<_> = rows.iter().map(|r| r.temperature_smooth).collect();

        assert_eq!(smoothed, vec![None, Some(4.0), Some(6.0), None]);
    }

    #[test]
    fn test_empty_series() {
        // ---
        assert!(smooth(&series(&[])).is_empty());
    }
}
