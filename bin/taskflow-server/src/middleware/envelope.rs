//! Uniform error envelope for every non-2xx response.
//!
//! Handler errors arrive already enveloped by [`ServerError`] and tagged with
//! an [`ErrorResponse`] extension; this layer only adds the request path.
//! Anything else (extractor rejections, unmatched routes, wrong methods,
//! caught panics) is rewritten into the same shape.

use std::any::Any;

use axum::{
    Json,
    body::{self, Body},
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{GENERIC_MESSAGE, ServerError};
use crate::schemas::error::ErrorResponse;

/// Rejection bodies are short plain text; anything past this is cut off.
const MAX_REJECTION_BODY: usize = 16 * 1024;

pub async fn error_envelope(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let mut envelope = match parts.extensions.remove::<ErrorResponse>() {
        Some(envelope) => envelope,
        None => {
            let text = body::to_bytes(body, MAX_REJECTION_BODY)
                .await
                .map(|b| String::from_utf8_lossy(&b).trim().to_owned())
                .unwrap_or_default();
            // 5xx bodies from outside our error type are never echoed.
            let message = if status.is_server_error() {
                GENERIC_MESSAGE.to_owned()
            } else if text.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_owned()
            } else {
                text
            };
            ErrorResponse::new(status, message)
        }
    };
    envelope.path = path;

    let mut rebuilt = (status, Json(envelope)).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt
}

/// Response for a handler panic caught by `CatchPanicLayer`.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    ServerError::Internal(GENERIC_MESSAGE.to_owned()).into_response()
}
