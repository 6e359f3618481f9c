use axum::{
    Json,
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::GENERIC_MESSAGE;
use crate::schemas::error::ErrorResponse;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies larger than this are summarised instead of logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Cap on buffered bodies; matches axum's `DefaultBodyLimit`.
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// Run each request inside an `http_request` span keyed by a trace id.
///
/// The id is taken from the incoming `x-trace-id` header when it holds a
/// UUID, otherwise generated, and is echoed on the response.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let Some(req_bytes) = buffer_and_log("request", &parts.headers, body).await else {
            let mut envelope = ErrorResponse::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("request body exceeds {MAX_BUFFERED_BODY} bytes"),
            );
            envelope.path = path;
            let mut response = (StatusCode::PAYLOAD_TOO_LARGE, Json(envelope)).into_response();
            if let Some(v) = header_value {
                response.headers_mut().insert(X_TRACE_ID, v);
            }
            return response;
        };
        let mut req = Request::from_parts(parts, Body::from(req_bytes));
        if let Some(v) = &header_value {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let mut response = match buffer_and_log("response", &parts.headers, body).await {
            Some(res_bytes) => Response::from_parts(parts, Body::from(res_bytes)),
            None => {
                let mut envelope =
                    ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE);
                envelope.path = path;
                (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
            }
        };
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Collect at most [`MAX_BUFFERED_BODY`] bytes, logging the body when it is
/// small JSON. `None` when the body is too large or fails mid-stream.
async fn buffer_and_log(direction: &str, headers: &HeaderMap, body: Body) -> Option<Bytes> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let is_json = content_type.contains("application/json");

    let bytes = match Limited::new(body, MAX_BUFFERED_BODY).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "{} body could not be buffered", direction);
            return None;
        }
    };

    if is_json && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            info!("{} body: {}", direction, text);
        }
    } else if !bytes.is_empty() {
        info!(
            "{} body: [skipped: type={}, size={}]",
            direction,
            content_type,
            bytes.len()
        );
    }

    Some(bytes)
}
