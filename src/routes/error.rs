//! Mapping of handler failures onto HTTP responses.
//!
//! Bad caller input becomes `400` with a `{"detail": ...}` body; storage
//! failures are logged and reported as a bare `500`.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use envflow::PipelineError;
use serde_json::json;

// ---

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::Internal("Database error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
