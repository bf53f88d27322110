//! Per-channel outlier detection.
//!
//! Two rules are available. The interquartile-range rule is the default and
//! is what the ingestion pipeline persists; the z-score rule backs the
//! "clean" helper and can be selected through configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Channel, Channels, ProcessedReading, Reading};
use crate::pipeline::stats;

// ---

/// Fence multiplier for the interquartile-range rule.
pub const IQR_FENCE: f64 = 1.5;

/// Absolute z-score above which a value is an outlier.
pub const Z_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    #[default]
    Iqr,
    ZScore,
}

impl FromStr for AnomalyMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(AnomalyMethod::Iqr),
            "zscore" | "z-score" | "z" => Ok(AnomalyMethod::ZScore),
            other => Err(format!("unknown anomaly method '{other}'")),
        }
    }
}

/// Inclusive band of normal values for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub low: f64,
    pub high: f64,
}

impl Fence {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` over the given values.
pub fn iqr_fence(values: &[f64]) -> Option<Fence> {
    // ---
    let q1 = stats::quantile(values, 0.25)?;
    let q3 = stats::quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some(Fence {
        low: q1 - IQR_FENCE * iqr,
        high: q3 + IQR_FENCE * iqr,
    })
}

/// Flag every value whose `|v - mean| / std` exceeds [`Z_THRESHOLD`].
///
/// With fewer than two values or zero spread nothing is flagged.
pub fn zscore_flags(values: &[f64]) -> Vec<bool> {
    // ---
    let (Some(mean), Some(std)) = (stats::mean(values), stats::sample_std(values)) else {
        return vec![false; values.len()];
    };
    if std == 0.0 {
        return vec![false; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - mean) / std).abs() > Z_THRESHOLD)
        .collect()
}

/// Set the `*_anomaly` flags of every row, channel by channel.
///
/// Thresholds come from this series alone. Flags depend only on channel
/// values, so running this twice gives the same flags. Undefined values are
/// never flagged.
pub fn detect_anomalies(rows: &mut [ProcessedReading], method: AnomalyMethod) {
    // ---
    for channel in Channel::ALL {
        let defined: Vec<(usize, f64)> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.value(channel).map(|v| (i, v)))
            .collect();
        let values: Vec<f64> = defined.iter().map(|&(_, v)| v).collect();

        let flags = match method {
            AnomalyMethod::Iqr => match iqr_fence(&values) {
                Some(fence) => values.iter().map(|&v| !fence.contains(v)).collect(),
                None => Vec::new(),
            },
            AnomalyMethod::ZScore => zscore_flags(&values),
        };

        for row in rows.iter_mut() {
            row.set_anomaly(channel, false);
        }
        for (&(idx, _), flag) in defined.iter().zip(flags) {
            rows[idx].set_anomaly(channel, flag);
        }

        let flagged = rows.iter().filter(|r| r.anomaly(channel)).count();
        tracing::debug!("{:?} anomaly pass on {}: {} flagged", method, channel, flagged);
    }
}

/// A raw reading with its per-channel z-score flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub anomaly: Channels<bool>,
}

/// Drop exact duplicate readings, then z-score flag each channel of the rest.
///
/// Works on raw validated readings, not on the resampled grid.
pub fn clean_and_flag(readings: &[Reading]) -> Vec<FlaggedReading> {
    // ---
    let mut unique: Vec<Reading> = Vec::with_capacity(readings.len());
    for reading in readings {
        if !unique.contains(reading) {
            unique.push(*reading);
        }
    }

    let flags = Channels::from_fn(|c| {
        let values: Vec<f64> = unique.iter().map(|r| r.value(c)).collect();
        zscore_flags(&values)
    });

    tracing::debug!(
        "Cleaned {} readings down to {} unique",
        readings.len(),
        unique.len()
    );

    unique
        .into_iter()
        .enumerate()
        .map(|(i, reading)| FlaggedReading {
            reading,
            anomaly: Channels::from_fn(|c| flags.get(c)[i]),
        })
        .collect()
}
