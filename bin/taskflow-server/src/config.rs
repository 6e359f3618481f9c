//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for taskflow-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// Database URL (default: `"sqlite://taskflow.db?mode=rwc"`).
    pub database_url: String,

    /// Upper bound on pooled database connections. In-memory SQLite always
    /// uses a single connection.
    pub database_max_connections: u32,

    /// `tracing` filter string, e.g. `"info"` or `"debug,sqlx=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rolling log files. Stdout only when unset.
    pub log_dir: Option<String>,

    /// Comma-separated allowed CORS origins. Wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_owned(),
            database_url: "sqlite://taskflow.db?mode=rwc".to_owned(),
            database_max_connections: 5,
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            enable_docs: true,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("TASKFLOW_BIND", &defaults.bind_address),
            database_url: env_or("TASKFLOW_DATABASE_URL", &defaults.database_url),
            database_max_connections: parse_env(
                "TASKFLOW_DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            log_level: env_or("TASKFLOW_LOG", &defaults.log_level),
            log_json: env_flag("TASKFLOW_LOG_JSON", defaults.log_json),
            log_dir: env_opt("TASKFLOW_LOG_DIR"),
            cors_allowed_origins: env_opt("TASKFLOW_CORS_ORIGINS"),
            enable_docs: env_flag("TASKFLOW_ENABLE_DOCS", defaults.enable_docs),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
