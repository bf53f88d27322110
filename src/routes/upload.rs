//! `POST /sensor/data`: CSV upload through the ingestion pipeline.

use axum::{extract::State, routing::post, Json, Router};
use envflow::pipeline::{parse_record, ChannelSummary, DateRange};
use envflow::{parse_csv_batch, process, Channels, Reading};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::ApiResult;
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/data", post(handler))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: &'static str,
    batch_id: Uuid,
    raw_rows: usize,
    processed_rows: usize,
    date_range: DateRange,
    summary: Channels<ChannelSummary>,
}

async fn handler(
    State((pool, config)): State<(PgPool, Config)>,
    body: String,
) -> ApiResult<Json<UploadResponse>> {
    // ---
    let batch_id = Uuid::new_v4();
    info!("POST /sensor/data - batch {} ({} bytes)", batch_id, body.len());

    // Step 1: Decode rows
    let records = parse_csv_batch(body.as_bytes())?;

    // Step 2: Keep every parseable row as the raw record set
    let raw: Vec<Reading> = records.iter().filter_map(parse_record).collect();
    debug!("POST /sensor/data - {} of {} rows parseable", raw.len(), records.len());

    // Step 3: Run the pipeline before touching storage
    let processed = process(&records, &config.pipeline)?;

    // Step 4: Persist raw and processed rows together
    store::save_upload(&pool, batch_id, &raw, &processed.graph_data).await?;

    info!(
        "Batch {} stored: {} raw rows, {} processed rows",
        batch_id,
        raw.len(),
        processed.graph_data.len()
    );

    Ok(Json(UploadResponse {
        message: "Data uploaded and processed successfully",
        batch_id,
        raw_rows: raw.len(),
        processed_rows: processed.graph_data.len(),
        date_range: processed.date_range,
        summary: processed.summary,
    }))
}
