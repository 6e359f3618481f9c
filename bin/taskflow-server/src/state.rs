//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::AnyStore;
use crate::services::TaskService;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Task operations backed by the persistent store.
    pub tasks: TaskService<AnyStore>,
}

impl AppState {
    pub fn new(config: Config, store: AnyStore) -> Self {
        Self {
            config: Arc::new(config),
            tasks: TaskService::new(Arc::new(store)),
        }
    }
}
