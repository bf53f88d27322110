use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod error;
mod health;
mod insights;
mod params;
mod processed;
mod upload;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    let sensor = Router::new()
        .merge(upload::router())
        .merge(processed::router())
        .merge(insights::router());

    Router::new()
        .nest("/sensor", sensor)
        .merge(health::router())
        .with_state((pool, config))
}
