//! Error types for the dayplan service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Top-level error type for the scheduling service.
///
/// Every handler failure flows through [`IntoResponse`] below, which is the
/// single place that decides status codes and body shapes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller-supplied fields missing, wrong type, or empty where required.
    /// Reported before any upstream call is made.
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream completion text was not parseable JSON or failed schema
    /// validation. Carries the offending text so prompt/model drift can be
    /// diagnosed from the response alone.
    #[error("Invalid response format")]
    UpstreamFormat {
        /// The raw model output that failed to parse or validate.
        raw: String,
    },

    /// Network, credential, or service failure talking to an upstream API.
    #[error("{0}")]
    Upstream(String),

    /// The record store rejected the operation; its error payload is
    /// returned to the caller verbatim.
    #[error("record store error: {0}")]
    RecordStore(serde_json::Value),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "message": message }),
            ),
            Self::UpstreamFormat { raw } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": "Invalid response format", "raw": raw }),
            ),
            Self::RecordStore(payload) => (StatusCode::INTERNAL_SERVER_ERROR, payload),
            Self::Upstream(message) | Self::Config(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": message }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ApiError>;
