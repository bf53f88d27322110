//! Read endpoints over stored processed rows: `/processed` and `/visualized`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use envflow::query::{project, ProcessedQuery, ProjectedReading};
use envflow::ProcessedReading;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use super::error::ApiResult;
use super::params;
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/processed", get(processed))
        .route("/visualized", get(visualized))
}

/// Query parameters for `GET /sensor/processed`.
#[derive(Debug, Deserialize)]
pub struct ProcessedParams {
    start_time: Option<String>,
    end_time: Option<String>,
    /// Comma-separated channel names, e.g. `temperature,humidity`.
    metrics: Option<String>,
    smooth: Option<bool>,
    anomaly_only: Option<bool>,
    latest_only: Option<bool>,
    skip: Option<i64>,
    limit: Option<i64>,
}

async fn processed(
    Query(params): Query<ProcessedParams>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> ApiResult<Json<Vec<ProjectedReading>>> {
    // ---
    info!("GET /sensor/processed - {:?}", params);

    let (skip, limit) = params::page(params.skip, params.limit)?;

    let query = ProcessedQuery {
        range: params::time_range(params.start_time.as_deref(), params.end_time.as_deref())?,
        metrics: params::metrics(params.metrics.as_deref())?,
        smooth: params.smooth.unwrap_or(true),
        anomaly_only: params.anomaly_only.unwrap_or(false),
        latest_only: params.latest_only.unwrap_or(false),
        skip,
        limit,
    };

    let rows = store::load_processed(&pool, &query.range).await?;
    Ok(Json(project(&rows, &query)))
}

/// Query parameters for `GET /sensor/visualized`.
#[derive(Debug, Deserialize)]
pub struct VisualizedParams {
    start_time: Option<String>,
    end_time: Option<String>,
    skip: Option<i64>,
    limit: Option<i64>,
    /// `asc` (default) or `desc`.
    order: Option<String>,
}

#[derive(Debug, Serialize)]
struct VisualizedPage {
    total: i64,
    data: Vec<ProcessedReading>,
}

async fn visualized(
    Query(params): Query<VisualizedParams>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> ApiResult<Json<VisualizedPage>> {
    // ---
    info!("GET /sensor/visualized - {:?}", params);

    let range = params::time_range(params.start_time.as_deref(), params.end_time.as_deref())?;
    let (skip, limit) = params::page(params.skip, params.limit)?;
    let descending = params.order.as_deref() == Some("desc");

    let (total, data) =
        store::page_processed(&pool, &range, skip as i64, limit as i64, descending).await?;
    Ok(Json(VisualizedPage { total, data }))
}
