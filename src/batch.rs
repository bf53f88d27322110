//! Decoding of delimited-text uploads into raw records.
//!
//! This sits on the caller's side of the validator: it only splits rows into
//! named fields and never judges their content.

use std::io::Read;

use csv::{ReaderBuilder, Trim};

use crate::error::Result;
use crate::models::RawRecord;

// ---

/// Decode a CSV stream with a header row into one [`RawRecord`] per data row.
///
/// Rows shorter than the header simply lack the trailing fields; the validator
/// drops them later if a required field is missing.
pub fn parse_csv_batch<R: Read>(input: R) -> Result<Vec<RawRecord>> {
    // ---
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        records.push(record);
    }

    tracing::debug!("Decoded {} raw records from CSV", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_parse_csv_keeps_all_columns() {
        // ---
        let csv = "timestamp,temperature,humidity,air_quality,site\n\
                   2025-03-26 10:00:00,21.5,40,12,roof\n";
        let records = parse_csv_batch(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["temperature"], "21.5");
        assert_eq!(records[0]["site"], "roof");
    }

    #[test]
    fn test_parse_csv_short_rows_lack_fields() {
        // ---
        let csv = "timestamp,temperature,humidity,air_quality\n\
                   2025-03-26 10:00:00, 21.5 ,40\n";
        let records = parse_csv_batch(csv.as_bytes()).unwrap();

        assert_eq!(records[0]["temperature"], "21.5");
        assert!(!records[0].contains_key("air_quality"));
    }

    #[test]
    fn test_parse_csv_header_only() {
        // ---
        let records = parse_csv_batch("timestamp,temperature\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_csv_rejects_invalid_utf8() {
        // ---
        let bytes: &[u8] = b"timestamp,temperature\n\xff\xfe,1\n";
        assert!(parse_csv_batch(bytes).is_err());
    }
}
