//! Shared application state.

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::AssetStore;

/// State shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    config: AdminConfig,
    pool: PgPool,
    assets: AssetStore,
}

impl AppState {
    /// Build application state from configuration and a database pool.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let assets = AssetStore::new(config.asset_dir.clone(), config.asset_base_url.clone());
        Self {
            config,
            pool,
            assets,
        }
    }

    /// Application configuration.
    #[must_use]
    pub const fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Asset store.
    #[must_use]
    pub const fn assets(&self) -> &AssetStore {
        &self.assets
    }
}
