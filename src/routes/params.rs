//! Query-string helpers shared by the read endpoints.

use chrono::{DateTime, Utc};
use envflow::pipeline::validate::parse_timestamp;
use envflow::query::projection::{DEFAULT_LIMIT, MAX_LIMIT};
use envflow::query::TimeRange;
use envflow::Channel;

use super::error::{ApiError, ApiResult};

// ---

fn parse_time(name: &str, value: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    // ---
    match value {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {name}: {text}"))),
    }
}

/// Build the inclusive range from optional `start_time` / `end_time` strings.
pub fn time_range(start: Option<&str>, end: Option<&str>) -> ApiResult<TimeRange> {
    // ---
    let start = parse_time("start_time", start)?;
    let end = parse_time("end_time", end)?;
    Ok(TimeRange::new(start, end)?)
}

/// Comma-separated channel names; an absent or empty list selects all channels.
pub fn metrics(value: Option<&str>) -> ApiResult<Vec<Channel>> {
    // ---
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Channel::from_name(name)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown metric: {name}")))
        })
        .collect()
}

/// Validated `(skip, limit)`: skip defaults to 0, limit to `DEFAULT_LIMIT`.
pub fn page(skip: Option<i64>, limit: Option<i64>) -> ApiResult<(usize, usize)> {
    // ---
    let skip = skip.unwrap_or(0);
    if skip < 0 {
        return Err(ApiError::BadRequest("skip must be >= 0".to_string()));
    }
    let limit = limit.unwrap_or(DEFAULT_LIMIT as i64);
    if !(1..=MAX_LIMIT as i64).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok((skip as usize, limit as usize))
}
