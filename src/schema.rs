//! Database schema management for `envflow`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the append-only `raw_sensor_data` table and the
/// `processed_sensor_data` grid table. Safe to call on every startup; no-op
/// if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Raw readings exactly as uploaded, tagged with their upload batch
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_sensor_data (
            id          BIGSERIAL PRIMARY KEY,
            batch_id    UUID             NOT NULL,
            timestamp   TIMESTAMPTZ      NOT NULL,
            temperature DOUBLE PRECISION NOT NULL,
            humidity    DOUBLE PRECISION NOT NULL,
            air_quality DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // One row per grid point; re-uploads over the same span overwrite
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed_sensor_data (
            id                  BIGSERIAL PRIMARY KEY,
            timestamp           TIMESTAMPTZ NOT NULL UNIQUE,
            temperature         DOUBLE PRECISION,
            humidity            DOUBLE PRECISION,
            air_quality         DOUBLE PRECISION,
            temperature_smooth  DOUBLE PRECISION,
            humidity_smooth     DOUBLE PRECISION,
            air_quality_smooth  DOUBLE PRECISION,
            temperature_anomaly BOOLEAN NOT NULL DEFAULT FALSE,
            humidity_anomaly    BOOLEAN NOT NULL DEFAULT FALSE,
            air_quality_anomaly BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_raw_sensor_data_timestamp
            ON raw_sensor_data (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_raw_sensor_data_batch_id
            ON raw_sensor_data (batch_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
