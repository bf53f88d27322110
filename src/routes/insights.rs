//! Statistical read endpoints: summary statistics, windowed rollups and the
//! seven-day comparison.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use envflow::pipeline::ChannelSummary;
use envflow::query::comparison::COMPARISON_DAYS;
use envflow::query::{
    aggregate, compare_last_7_days, summary_statistics, DaySeries, RollupRow, TimeRange,
};
use envflow::{Channels, Window};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use super::error::ApiResult;
use super::params;
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/7day-comparison", get(seven_day_comparison))
        .route("/aggregated", get(aggregated))
        .route("/aggregated-insight", get(aggregated_insight))
}

/// Time-range parameters shared by the statistics endpoints.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    start_time: Option<String>,
    end_time: Option<String>,
}

/// Parameters for `GET /sensor/aggregated-insight`.
#[derive(Debug, Deserialize)]
pub struct InsightParams {
    /// Aggregation window such as `10min`, `1h`, `1d` (default `1h`).
    window: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

async fn seven_day_comparison(
    State((pool, _config)): State<(PgPool, Config)>,
) -> ApiResult<Json<Vec<DaySeries>>> {
    // ---
    info!("GET /sensor/7day-comparison");

    let now = Utc::now();
    let range = TimeRange::new(Some(now - Duration::days(COMPARISON_DAYS)), Some(now))?;
    let rows = store::load_processed(&pool, &range).await?;

    Ok(Json(compare_last_7_days(&rows, now)))
}

async fn aggregated(
    Query(params): Query<RangeParams>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> ApiResult<Json<Channels<ChannelSummary>>> {
    // ---
    info!("GET /sensor/aggregated - {:?}", params);

    let range = params::time_range(params.start_time.as_deref(), params.end_time.as_deref())?;
    let rows = store::load_processed(&pool, &range).await?;

    Ok(Json(summary_statistics(&rows, &range)))
}

async fn aggregated_insight(
    Query(params): Query<InsightParams>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> ApiResult<Json<Vec<RollupRow>>> {
    // ---
    info!("GET /sensor/aggregated-insight - {:?}", params);

    // Validate everything before reading storage
    let window: Window = params.window.as_deref().unwrap_or("1h").parse()?;
    let range = params::time_range(params.start_time.as_deref(), params.end_time.as_deref())?;

    let rows = store::load_processed(&pool, &range).await?;
    Ok(Json(aggregate(&rows, window, &range)?))
}
