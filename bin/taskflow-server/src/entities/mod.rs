//! Database abstraction layer.
//!
//! [`TaskStore`] defines the persistence gateway for task records. The
//! default implementation is [`AnyStore`], a `sqlx` Any-driver pool pointed
//! at SQLite. To swap to another database, implement [`TaskStore`] for your
//! new type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod dao;
pub mod task;

pub use dao::TaskRecord;
pub use task::TaskStore;

use std::str::FromStr;

use sqlx::any::{AnyConnectOptions, AnyPoolOptions};

#[derive(Clone, Debug)]
pub struct AnyStore {
    pool: sqlx::Pool<sqlx::Any>,
}

impl AnyStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://taskflow.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    /// An in-memory database lives inside a single connection, so the pool
    /// is pinned to one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(url)?;

        let pool_options = if is_in_memory(url) {
            AnyPoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await?;

        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection. Subsequent queries fail with
    /// [`sqlx::Error::PoolClosed`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
