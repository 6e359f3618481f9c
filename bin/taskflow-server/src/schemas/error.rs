use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    /// Numeric HTTP status code.
    pub status: u16,
    /// Short status phrase, e.g. `"Not Found"`.
    pub error: String,
    pub message: String,
    /// Request path that produced the error.
    pub path: String,
}

impl ErrorResponse {
    /// Envelope stamped with the current time. `path` is left empty; the
    /// `error_envelope` middleware fills it in from the request URI.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            message: message.into(),
            path: String::new(),
        }
    }
}
