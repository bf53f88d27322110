//! Data models shared by the processing pipeline and the read-time queries.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One decoded input row, keyed by column name (case-sensitive).
pub type RawRecord = HashMap<String, String>;

/// The three measured channels of an environmental reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Temperature,
    Humidity,
    AirQuality,
}

impl Channel {
    // ---
    pub const ALL: [Channel; 3] = [Channel::Temperature, Channel::Humidity, Channel::AirQuality];

    /// Column name used on the wire and in storage.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::AirQuality => "air_quality",
        }
    }

    /// Inclusive domain bounds a validated reading must respect.
    pub fn valid_range(self) -> (f64, f64) {
        match self {
            Channel::Temperature => (-30.0, 60.0),
            Channel::Humidity => (0.0, 100.0),
            Channel::AirQuality => (0.0, 500.0),
        }
    }

    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value per channel, so per-channel work is an explicit loop over typed fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Channels<T> {
    // ---
    pub temperature: T,
    pub humidity: T,
    pub air_quality: T,
}

impl<T> Channels<T> {
    // ---
    pub fn from_fn(mut f: impl FnMut(Channel) -> T) -> Self {
        Channels {
            temperature: f(Channel::Temperature),
            humidity: f(Channel::Humidity),
            air_quality: f(Channel::AirQuality),
        }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Humidity => &self.humidity,
            Channel::AirQuality => &self.air_quality,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Humidity => &mut self.humidity,
            Channel::AirQuality => &mut self.air_quality,
        }
    }
}

/// A validated raw reading. Immutable once it leaves the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
}

impl Reading {
    // ---
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::AirQuality => self.air_quality,
        }
    }

    pub fn values(&self) -> Channels<f64> {
        Channels::from_fn(|c| self.value(c))
    }
}

/// One grid row of the processed series.
///
/// Channel and smoothed values are nullable: a gap at either end of the
/// series has no interpolation neighbour and stays undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProcessedReading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality: Option<f64>,
    pub temperature_smooth: Option<f64>,
    pub humidity_smooth: Option<f64>,
    pub air_quality_smooth: Option<f64>,
    pub temperature_anomaly: bool,
    pub humidity_anomaly: bool,
    pub air_quality_anomaly: bool,
}

impl ProcessedReading {
    // ---
    /// A row carrying channel values only; smoothing and flags are filled by later stages.
    pub fn new(timestamp: DateTime<Utc>, values: Channels<Option<f64>>) -> Self {
        ProcessedReading {
            timestamp,
            temperature: values.temperature,
            humidity: values.humidity,
            air_quality: values.air_quality,
            temperature_smooth: None,
            humidity_smooth: None,
            air_quality_smooth: None,
            temperature_anomaly: false,
            humidity_anomaly: false,
            air_quality_anomaly: false,
        }
    }

    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::AirQuality => self.air_quality,
        }
    }

    pub fn smooth(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature_smooth,
            Channel::Humidity => self.humidity_smooth,
            Channel::AirQuality => self.air_quality_smooth,
        }
    }

    pub fn anomaly(&self, channel: Channel) -> bool {
        match channel {
            Channel::Temperature => self.temperature_anomaly,
            Channel::Humidity => self.humidity_anomaly,
            Channel::AirQuality => self.air_quality_anomaly,
        }
    }

    pub fn set_smooth(&mut self, channel: Channel, value: Option<f64>) {
        match channel {
            Channel::Temperature => self.temperature_smooth = value,
            Channel::Humidity => self.humidity_smooth = value,
            Channel::AirQuality => self.air_quality_smooth = value,
        }
    }

    pub fn set_anomaly(&mut self, channel: Channel, flag: bool) {
        match channel {
            Channel::Temperature => self.temperature_anomaly = flag,
            Channel::Humidity => self.humidity_anomaly = flag,
            Channel::AirQuality => self.air_quality_anomaly = flag,
        }
    }
}
