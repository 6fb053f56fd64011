//! Error responses for the HTTP API
//!
//! Every failure is returned as `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Dataset not loaded yet, or the last load failed (503)
    #[error("Data unavailable: {0}")]
    Unavailable(String),

    /// bsb-common error
    #[error(transparent)]
    Common(#[from] bsb_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE", msg)
            }
            ApiError::Common(err) => {
                let (status, code) = match &err {
                    bsb_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                    bsb_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    bsb_common::Error::DataUnavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE")
                    }
                    bsb_common::Error::Preferences(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "PREFERENCES_ERROR")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
