//! Fixed-width time windows and the bucket grid they define.
//!
//! A window is written as an optional positive count followed by a unit,
//! e.g. `10min`, `1h`, `1H`, `1d`, `30s`, `15T`, `w`. Calendar units
//! (months, years) are not fixed durations and are rejected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::error::{PipelineError, Result};

// ---

/// Widest accepted window. Keeps every grid step far inside chrono's range.
pub const MAX_WINDOW_SECONDS: i64 = i32::MAX as i64;

/// Most grid points a single resample or aggregation may produce.
pub const MAX_GRID_POINTS: i64 = 1_000_000;

/// A validated, strictly positive bucket width of at most [`MAX_WINDOW_SECONDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(Duration);

impl Window {
    // ---
    pub fn from_duration(duration: Duration) -> Result<Self> {
        let seconds = duration.num_seconds();
        if duration <= Duration::zero() || !(1..=MAX_WINDOW_SECONDS).contains(&seconds) {
            return Err(PipelineError::InvalidWindow(format!("{duration}")));
        }
        Ok(Window(duration))
    }

    pub fn one_hour() -> Self {
        Window(Duration::seconds(3_600))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn num_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Start of the grid: midnight UTC of the day holding `first`.
    pub fn grid_origin(first: DateTime<Utc>) -> DateTime<Utc> {
        first.date_naive().and_time(NaiveTime::MIN).and_utc()
    }

    /// Start of the half-open bucket `[start, start + window)` containing `ts`.
    pub fn bucket_start(&self, origin: DateTime<Utc>, ts: DateTime<Utc>) -> DateTime<Utc> {
        // ---
        let width = self.num_seconds();
        let offset = (ts - origin).num_seconds().div_euclid(width);
        // offset * width lies in [0, ts - origin], so the sum stays in range.
        Duration::try_seconds(offset * width)
            .and_then(|d| origin.checked_add_signed(d))
            .unwrap_or(ts)
    }

    /// Every grid point from the bucket holding `first` to the bucket holding `last`.
    ///
    /// Fails when the span would need more than [`MAX_GRID_POINTS`] buckets.
    pub fn grid(&self, first: DateTime<Utc>, last: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        // ---
        let origin = Self::grid_origin(first);
        let start = self.bucket_start(origin, first);
        let end = self.bucket_start(origin, last);

        let buckets = (end - start).num_seconds() / self.num_seconds() + 1;
        if buckets > MAX_GRID_POINTS {
            return Err(PipelineError::TooManyBuckets {
                window: self.to_string(),
                buckets,
                limit: MAX_GRID_POINTS,
            });
        }

        let mut points = Vec::with_capacity(buckets as usize);
        let mut current = Some(start);
        while let Some(point) = current.filter(|p| *p <= end) {
            points.push(point);
            current = point.checked_add_signed(self.0);
        }
        Ok(points)
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::one_hour()
    }
}

impl FromStr for Window {
    type Err = PipelineError;

    fn from_str(spec: &str) -> Result<Self> {
        // ---
        let invalid = || PipelineError::InvalidWindow(spec.to_string());
        let trimmed = spec.trim();

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, unit) = trimmed.split_at(split);

        let count: i64 = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        if count <= 0 {
            return Err(invalid());
        }

        let unit_seconds: i64 = match unit {
            "s" | "S" | "sec" | "second" | "seconds" => 1,
            "min" | "T" | "m" | "minute" | "minutes" => 60,
            "h" | "H" | "hour" | "hours" => 3_600,
            "d" | "D" | "day" | "days" => 86_400,
            "w" | "W" | "week" | "weeks" => 604_800,
            _ => return Err(invalid()),
        };

        let seconds = count
            .checked_mul(unit_seconds)
            .filter(|s| *s <= MAX_WINDOW_SECONDS)
            .ok_or_else(invalid)?;
        let duration = Duration::try_seconds(seconds).ok_or_else(invalid)?;
        Window::from_duration(duration)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.num_seconds();
        match secs {
            s if s % 604_800 == 0 => write!(f, "{}w", s / 604_800),
            s if s % 86_400 == 0 => write!(f, "{}d", s / 86_400),
            s if s % 3_600 == 0 => write!(f, "{}h", s / 3_600),
            s if s % 60 == 0 => write!(f, "{}min", s / 60),
            s => write!(f, "{s}s"),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_common_windows() {
        // ---
        assert_eq!("10min".parse::<Window>().unwrap().num_seconds(), 600);
        assert_eq!("1h".parse::<Window>().unwrap().num_seconds(), 3_600);
        assert_eq!("1H".parse::<Window>().unwrap().num_seconds(), 3_600);
        assert_eq!("1d".parse::<Window>().unwrap().num_seconds(), 86_400);
        assert_eq!("15T".parse::<Window>().unwrap().num_seconds(), 900);
        assert_eq!(" 30s ".parse::<Window>().unwrap().num_seconds(), 30);
        assert_eq!("h".parse::<Window>().unwrap().num_seconds(), 3_600);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        // ---
        for bad in ["bogus", "", "10", "0h", "-1h", "1M", "1y", "1.5h", "h1"] {
            let err = bad.parse::<Window>().unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidWindow(_)),
                "expected InvalidWindow for {bad:?}"
            );
        }
    }

    #[test]
    fn test_display_uses_largest_unit() {
        // ---
        assert_eq!(Window::one_hour().to_string(), "1h");
        assert_eq!("90min".parse::<Window>().unwrap().to_string(), "90min");
        assert_eq!("48h".parse::<Window>().unwrap().to_string(), "2d");
    }

    #[test]
    fn test_bucket_start_is_half_open() {
        // ---
        let w = Window::one_hour();
        let origin = Window::grid_origin(at(7, 15));
        assert_eq!(origin, at(0, 0));
        assert_eq!(w.bucket_start(origin, at(7, 0)), at(7, 0));
        assert_eq!(w.bucket_start(origin, at(7, 59)), at(7, 0));
        assert_eq!(w.bucket_start(origin, at(8, 0)), at(8, 0));
    }

    #[test]
    fn test_grid_is_contiguous() {
        // ---
        let w: Window = "30min".parse().unwrap();
        let grid = w.grid(at(9, 10), at(10, 45)).unwrap();
        assert_eq!(grid, vec![at(9, 0), at(9, 30), at(10, 0), at(10, 30)]);
    }

    #[test]
    fn test_parse_rejects_oversized_windows() {
        // ---
        for huge in ["9300000000000000s", "100000000d", "9223372036854775807s", "3551w"] {
            let err = huge.parse::<Window>().unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidWindow(_)),
                "expected InvalidWindow for {huge:?}"
            );
        }
        assert!(Window::from_duration(Duration::days(30_000)).is_err());
        assert_eq!(
            "24855d".parse::<Window>().unwrap().num_seconds(),
            24_855 * 86_400
        );
    }

    #[test]
    fn test_widest_window_grid_stays_in_range() {
        // ---
        let w = Window::from_duration(Duration::seconds(MAX_WINDOW_SECONDS)).unwrap();
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let grid = w.grid(late, late).unwrap();
        assert_eq!(grid.len(), 1);
        assert!(grid[0] <= late);
    }

    #[test]
    fn test_grid_rejects_too_many_buckets() {
        // ---
        let w: Window = "1s".parse().unwrap();
        let first = at(0, 0);
        let last = first + Duration::days(365);
        let err = w.grid(first, last).unwrap_err();
        assert!(matches!(err, PipelineError::TooManyBuckets { .. }));

        let w: Window = "1min".parse().unwrap();
        assert_eq!(w.grid(first, last).unwrap().len(), 365 * 1_440 + 1);
    }
}
