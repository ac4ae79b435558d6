//! Concrete probes for the service's dependencies and the registries built from them

pub mod app;
pub mod cache;
pub mod database;

pub use app::HttpLivenessProbe;
pub use cache::{CacheProbe, RedisCache};
pub use database::{database_pool, DatabaseProbe};

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::health::CheckRegistry;
use std::sync::Arc;

pub const DATABASE_CHECK: &str = "database";
pub const CACHE_CHECK: &str = "cache";
pub const APP_CHECK: &str = "app";

/// Dependency handles, created once at startup and injected into probes.
#[derive(Clone)]
pub struct Dependencies {
    pub database: DatabaseProbe,
    pub cache: RedisCache,
}

impl Dependencies {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let pool = database_pool(
            &config.database.url,
            config.database.max_connections,
            config.database.acquire_timeout(),
        )?;
        let cache = RedisCache::open(&config.cache.url, config.cache.timeout())?;

        Ok(Self {
            database: DatabaseProbe::new(pool, &config.database.url),
            cache,
        })
    }
}

/// Checks behind the HTTP endpoints: database (mandatory) and cache.
pub fn server_registry(
    config: &AppConfig,
    deps: &Dependencies,
) -> Result<CheckRegistry, ConfigError> {
    let mut registry = CheckRegistry::new();

    registry
        .register(
            DATABASE_CHECK,
            Arc::new(deps.database.clone()),
            config.database.timeout(),
            true,
        )?
        .register(
            CACHE_CHECK,
            Arc::new(CacheProbe::new(deps.cache.clone())),
            config.cache.timeout(),
            config.cache.mandatory,
        )?;

    Ok(registry)
}

/// The server's checks plus a fetch of the running application's liveness URL.
pub fn cli_registry(
    config: &AppConfig,
    deps: &Dependencies,
) -> Result<CheckRegistry, ConfigError> {
    let mut registry = server_registry(config, deps)?;

    let app_probe = HttpLivenessProbe::new(&config.liveness_url(), config.liveness.timeout())?;
    registry.register(APP_CHECK, Arc::new(app_probe), config.liveness.timeout(), true)?;

    Ok(registry)
}
