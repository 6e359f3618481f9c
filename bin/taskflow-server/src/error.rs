//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to the JSON [`ErrorResponse`] envelope with an appropriate status code.
//!
//! **Security note:** database errors are logged with full detail but only a
//! generic message is returned to the caller so that SQL, file paths, or
//! other implementation details never leak to clients.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info};
use validator::ValidationErrors;

use crate::schemas::error::ErrorResponse;

/// Message returned for 500s that carry no safe description.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// All errors that can occur in the request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the task store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller referenced a task that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body could not be read as the expected JSON shape.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body failed field validation.
    #[error("validation failed: {}", validation_message(.0))]
    Validation(#[from] ValidationErrors),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match &self {
            ServerError::NotFound(m) => {
                debug!(message = %m, "task not found");
                m.clone()
            }
            ServerError::BadRequest(m) => {
                info!(message = %m, "malformed request body");
                m.clone()
            }
            ServerError::Validation(e) => {
                let message = validation_message(e);
                info!(%message, "request failed validation");
                message
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                GENERIC_MESSAGE.to_owned()
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                if m.is_empty() { GENERIC_MESSAGE.to_owned() } else { m.clone() }
            }
        };

        let body = ErrorResponse::new(status, client_message);
        let mut response = (status, Json(body.clone())).into_response();
        // Marks the response as already enveloped; the middleware only adds the path.
        response.extensions_mut().insert(body);
        response
    }
}

/// Body rejections (syntax, data, content type) all surface as 400 with
/// axum's rejection text as the message.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        // Log the full chain before flattening it into a message.
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

/// Render validation failures as `"field: reason"` entries joined by `", "`,
/// sorted so the message is stable across runs.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut entries: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let reason = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {reason}")
            })
        })
        .collect();
    entries.sort();
    entries.join(", ")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
