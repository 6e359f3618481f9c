use crate::config::Config;
use tower_http::cors::{Any, CorsLayer};

pub fn cors_layer(config: &Config) -> CorsLayer {
    // Parse the comma-separated origin list; anything unparsable is dropped.
    let origins: Vec<axum::http::HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        // Wildcard – suitable for development; set TASKFLOW_CORS_ORIGINS in production.
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
