//! Postgres persistence for raw and processed readings.
//!
//! Raw rows are append-only. Processed rows are keyed by grid timestamp, so a
//! later upload covering the same span replaces earlier values instead of
//! duplicating them.

use envflow::query::TimeRange;
use envflow::{ProcessedReading, Reading};
use sqlx::PgPool;
use uuid::Uuid;

// ---

const PROCESSED_COLUMNS: &str = "timestamp, temperature, humidity, air_quality, \
     temperature_smooth, humidity_smooth, air_quality_smooth, \
     temperature_anomaly, humidity_anomaly, air_quality_anomaly";

const RANGE_FILTER: &str = "($1::timestamptz IS NULL OR timestamp >= $1) \
     AND ($2::timestamptz IS NULL OR timestamp <= $2)";

/// Write one upload's raw and processed rows in a single transaction.
///
/// Called only after the pipeline has fully succeeded, so a batch is either
/// stored completely or not at all.
pub async fn save_upload(
    pool: &PgPool,
    batch_id: Uuid,
    raw: &[Reading],
    processed: &[ProcessedReading],
) -> Result<(), sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    for reading in raw {
        sqlx::query(
            r#"
            INSERT INTO raw_sensor_data (batch_id, timestamp, temperature, humidity, air_quality)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(batch_id)
        .bind(reading.timestamp)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.air_quality)
        .execute(&mut *tx)
        .await?;
    }

    for row in processed {
        sqlx::query(
            r#"
            INSERT INTO processed_sensor_data (
                timestamp, temperature, humidity, air_quality,
                temperature_smooth, humidity_smooth, air_quality_smooth,
                temperature_anomaly, humidity_anomaly, air_quality_anomaly
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (timestamp) DO UPDATE SET
                temperature         = EXCLUDED.temperature,
                humidity            = EXCLUDED.humidity,
                air_quality         = EXCLUDED.air_quality,
                temperature_smooth  = EXCLUDED.temperature_smooth,
                humidity_smooth     = EXCLUDED.humidity_smooth,
                air_quality_smooth  = EXCLUDED.air_quality_smooth,
                temperature_anomaly = EXCLUDED.temperature_anomaly,
                humidity_anomaly    = EXCLUDED.humidity_anomaly,
                air_quality_anomaly = EXCLUDED.air_quality_anomaly
            "#,
        )
        .bind(row.timestamp)
        .bind(row.temperature)
        .bind(row.humidity)
        .bind(row.air_quality)
        .bind(row.temperature_smooth)
        .bind(row.humidity_smooth)
        .bind(row.air_quality_smooth)
        .bind(row.temperature_anomaly)
        .bind(row.humidity_anomaly)
        .bind(row.air_quality_anomaly)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(
        "Stored batch {}: {} raw rows, {} processed rows",
        batch_id,
        raw.len(),
        processed.len()
    );
    Ok(())
}

/// Load processed rows inside `range`, ascending by timestamp.
pub async fn load_processed(
    pool: &PgPool,
    range: &TimeRange,
) -> Result<Vec<ProcessedReading>, sqlx::Error> {
    // ---
    let sql = format!(
        "SELECT {PROCESSED_COLUMNS} FROM processed_sensor_data \
         WHERE {RANGE_FILTER} ORDER BY timestamp ASC"
    );
    sqlx::query_as::<_, ProcessedReading>(&sql)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(pool)
        .await
}

/// One page of processed rows plus the total number of rows in `range`.
pub async fn page_processed(
    pool: &PgPool,
    range: &TimeRange,
    skip: i64,
    limit: i64,
    descending: bool,
) -> Result<(i64, Vec<ProcessedReading>), sqlx::Error> {
    // ---
    let count_sql = format!("SELECT COUNT(*) FROM processed_sensor_data WHERE {RANGE_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(range.start())
        .bind(range.end())
        .fetch_one(pool)
        .await?;

    let order = if descending { "DESC" } else { "ASC" };
    let page_sql = format!(
        "SELECT {PROCESSED_COLUMNS} FROM processed_sensor_data \
         WHERE {RANGE_FILTER} ORDER BY timestamp {order} OFFSET $3 LIMIT $4"
    );
    let rows = sqlx::query_as::<_, ProcessedReading>(&page_sql)
        .bind(range.start())
        .bind(range.end())
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok((total, rows))
}
