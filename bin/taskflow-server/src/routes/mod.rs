//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - `/health` liveness probe
//! - `/api/tasks` CRUD routes
//! - `/api-docs/openapi.json` (disable with `TASKFLOW_ENABLE_DOCS=false`)
//!
//! wrapped in the error envelope, CORS and per-request trace-id layers.

pub mod doc;
mod health;
mod tasks;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;

use crate::middleware::{cors, envelope, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", tasks::router());

    if state.config.enable_docs {
        app = app.route("/api-docs/openapi.json", get(|| async { Json(doc::get_docs()) }));
    }

    app
        // Layers added later wrap the earlier ones; trace runs first on the way in.
        .layer(CatchPanicLayer::custom(envelope::panic_response))
        .layer(middleware::from_fn(envelope::error_envelope))
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

#[cfg(test)]
mod test {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::entities::AnyStore;
    use crate::middleware::trace::{MAX_BUFFERED_BODY, X_TRACE_ID};

    use super::*;

    async fn app(config: Config) -> Router {
        let store = AnyStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store");
        build(Arc::new(AppState::new(config, store)))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_is_mounted() {
        let response = app(Config::default()).await.oneshot(get_req("/health")).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn trace_id_is_echoed_or_generated() {
        let router = app(Config::default()).await;
        let incoming = Uuid::new_v4().to_string();
        let request = Request::builder()
            .uri("/health")
            .header(X_TRACE_ID, &incoming)
            .body(Body::empty())
            .expect("request");
        let response = router.clone().oneshot(request).await.expect("infallible");
        assert_eq!(
            response.headers().get(X_TRACE_ID).and_then(|v| v.to_str().ok()),
            Some(incoming.as_str())
        );

        let response = router.oneshot(get_req("/api/nothing")).await.expect("infallible");
        let generated = response
            .headers()
            .get(X_TRACE_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());
        assert!(generated.is_some());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_buffering() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header("content-type", "application/json")
            .body(Body::from(vec![b' '; MAX_BUFFERED_BODY + 1]))
            .expect("request");
        let response = app(Config::default()).await.oneshot(request).await.expect("infallible");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers().contains_key(X_TRACE_ID));
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], 413);
        assert_eq!(body["error"], "Payload Too Large");
        assert_eq!(body["path"], "/api/tasks");
    }

    #[tokio::test]
    async fn openapi_document_follows_config() {
        let response = app(Config::default())
            .await
            .oneshot(get_req("/api-docs/openapi.json"))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert!(body["paths"]["/api/tasks"].is_object());

        let config = Config { enable_docs: false, ..Config::default() };
        let response = app(config)
            .await
            .oneshot(get_req("/api-docs/openapi.json"))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
