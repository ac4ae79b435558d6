use crate::error::{CheckError, ConfigError};
use crate::health::{Probe, ProbeResult};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyConnection, AnyPool, Connection};
use std::time::Duration;
use tracing::{debug, info};

const SUPPORTED_SCHEMES: &[&str] = &["postgres", "postgresql", "sqlite"];

/// Builds a lazily connecting pool; nothing touches the network until the
/// first probe runs.
pub fn database_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<AnyPool, ConfigError> {
    if database_url.trim().is_empty() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }

    let scheme = database_url.split(':').next().unwrap_or_default();
    if !SUPPORTED_SCHEMES.contains(&scheme) {
        return Err(ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: format!(
                "unsupported scheme '{}', expected one of {:?}",
                scheme, SUPPORTED_SCHEMES
            ),
        });
    }

    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(0)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(Duration::from_secs(300))
        .connect_lazy(database_url)
        .map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: e.to_string(),
        })?;

    info!(scheme, max_connections, "Database pool configured");
    Ok(pool)
}

/// Round-trips a trivial query through the pool.
///
/// While the pool holds no connection the probe first dials the datastore
/// directly: the pool retries refused connects until its acquire timeout, which
/// would hide the driver's error behind a timeout.
#[derive(Clone)]
pub struct DatabaseProbe {
    pool: AnyPool,
    database_url: String,
}

impl DatabaseProbe {
    pub fn new(pool: AnyPool, database_url: impl Into<String>) -> Self {
        Self {
            pool,
            database_url: database_url.into(),
        }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Probe for DatabaseProbe {
    async fn check(&self) -> ProbeResult {
        if self.pool.size() == 0 {
            let connection = AnyConnection::connect(&self.database_url).await?;
            connection.close().await?;
        }

        let value: i64 = sqlx::query_scalar("SELECT CAST(1 AS BIGINT)")
            .fetch_one(&self.pool)
            .await?;

        debug!(
            pool_size = self.pool.size(),
            idle = self.pool.num_idle(),
            "Database ping succeeded"
        );

        if value == 1 {
            Ok(())
        } else {
            Err(CheckError::protocol(format!("unexpected ping result: {}", value)))
        }
    }
}
