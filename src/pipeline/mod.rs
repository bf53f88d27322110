//! Ingestion pipeline gateway.
//!
//! Stages run in a fixed order, each consuming the whole output of the
//! previous one:
//! validate → resample/interpolate → smooth → detect anomalies → summarize.
//!
//! Everything here is synchronous and free of shared state, so independent
//! batches can be processed concurrently without coordination.

pub mod anomaly;
pub mod resample;
pub mod smooth;
pub mod stats;
pub mod summary;
pub mod validate;

use crate::error::Result;
use crate::models::RawRecord;
use crate::window::Window;

pub use anomaly::{clean_and_flag, detect_anomalies, AnomalyMethod, FlaggedReading};
pub use resample::{resample, BucketRow, BucketedSeries};
pub use smooth::{smooth, SMOOTH_WINDOW};
pub use summary::{summarize, summarize_rows, ChannelSummary, DateRange, VisualSummary};
pub use validate::{parse_record, validate};

// ---

/// Parameters for one pipeline run, passed explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    // ---
    /// Grid spacing of the resampled series.
    pub resample_window: Window,

    /// Rule used for the persisted anomaly flags.
    pub anomaly_method: AnomalyMethod,
}

/// Run the full ingestion pipeline over one batch.
///
/// Bad records are dropped silently; a batch with nothing usable produces an
/// empty `graph_data` and null statistics. The summary covers the full span
/// of the batch; the only failure is a window too fine for the batch's span.
pub fn process(batch: &[RawRecord], config: &PipelineConfig) -> Result<VisualSummary> {
    // ---
    let readings = validate(batch);
    let series = resample(&readings, config.resample_window)?;
    let mut processed = smooth(&series);
    detect_anomalies(&mut processed, config.anomaly_method);

    tracing::info!(
        "Pipeline processed {} records into {} rows ({} window, {:?})",
        batch.len(),
        processed.len(),
        config.resample_window,
        config.anomaly_method
    );

    summarize(&processed, None, None)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn record(ts: &str, temp: &str, hum: &str, aq: &str) -> RawRecord {
        [
            ("timestamp", ts),
            ("temperature", temp),
            ("humidity", hum),
            ("air_quality", aq),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_process_fills_middle_bucket() {
        // ---
        let batch = [
            record("2025-03-26 00:00:00", "20", "50", "10"),
            record("2025-03-26 02:00:00", "24", "52", "12"),
        ];
        let out = process(&batch, &PipelineConfig::default()).unwrap();

        assert_eq!(out.graph_data.len(), 3);
        assert_eq!(out.graph_data[1].temperature, Some(22.0));
        assert_eq!(out.graph_data[2].temperature_smooth, Some(22.0));
        assert_eq!(out.summary.temperature.mean, Some(22.0));
    }

    #[test]
    fn test_process_empty_batch() {
        // ---
        let out = process(&[], &PipelineConfig::default()).unwrap();

        assert!(out.graph_data.is_empty());
        assert_eq!(out.date_range, DateRange::default());
        assert!(out.summary.temperature.is_empty());
        assert!(out.summary.humidity.is_empty());
        assert!(out.summary.air_quality.is_empty());
    }

    #[test]
    fn test_process_all_rows_rejected() {
        // ---
        let batch = [record("2025-03-26 00:00:00", "99", "50", "10")];
        let out = process(&batch, &PipelineConfig::default()).unwrap();
        assert!(out.graph_data.is_empty());
    }
}
