// src/routes/health.rs
//! API health check endpoint for the envflow service.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines. It follows the Explicit Module Boundary Pattern (EMBP):
//! the gateway (`mod.rs`) merges this subrouter so that `main.rs` never
//! needs to know about individual endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;

use crate::Config;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Handle `GET /health`.
///
/// Runs a trivial query so a lost database connection shows up as `503`.
async fn health(
    State((pool, _config)): State<(PgPool, Config)>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check database probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unreachable",
                }),
            )
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<(PgPool, Config)> {
    Router::new().route("/health", get(health))
}
