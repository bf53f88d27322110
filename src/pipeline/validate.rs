//! Schema and range validation of a raw batch.
//!
//! Bad rows are dropped rather than reported; the batch as a whole never fails
//! here. Extra columns are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::models::{Channel, RawRecord, Reading};

// ---

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Keep only records that parse and lie inside every channel's domain bounds.
pub fn validate(batch: &[RawRecord]) -> Vec<Reading> {
    // ---
    let clean: Vec<Reading> = batch
        .iter()
        .filter_map(parse_record)
        .filter(in_range)
        .collect();

    tracing::debug!(
        "Validated batch: kept {} of {} records",
        clean.len(),
        batch.len()
    );
    clean
}

/// Extract the four required fields, or `None` if any is missing or unparseable.
///
/// No range check is applied; see [`validate`] for the full filter.
pub fn parse_record(record: &RawRecord) -> Option<Reading> {
    // ---
    let timestamp = parse_timestamp(record.get("timestamp")?)?;
    let field = |c: Channel| record.get(c.name()).and_then(|v| parse_value(v));

    Some(Reading {
        timestamp,
        temperature: field(Channel::Temperature)?,
        humidity: field(Channel::Humidity)?,
        air_quality: field(Channel::AirQuality)?,
    })
}

/// Parse an RFC 3339 or naive timestamp; naive values are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    // ---
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn in_range(reading: &Reading) -> bool {
    Channel::ALL.into_iter().all(|c| {
        let (low, high) = c.valid_range();
        (low..=high).contains(&reading.value(c))
    })
}
