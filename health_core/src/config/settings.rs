use crate::error::ConfigError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub liveness: LivenessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub mandatory: bool,
    pub reconnect_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Defaults to this server's own `/health` when empty.
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            liveness: LivenessConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            timeout_ms: 3000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 2000,
            mandatory: false,
            reconnect_interval_seconds: 5,
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 5000,
        }
    }
}

/// Well-known variables that override the layered `APP_*` settings.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.url"),
    ("PORT", "server.port"),
    ("NODE_ENV", "environment"),
    ("APP_ENV", "environment"),
    ("APP_LIVENESS_URL", "liveness.url"),
];

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same layering as [`AppConfig::load`], with the well-known variables
    /// read through `lookup`.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var))?;
        }

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "PORT",
                reason: "server port cannot be 0".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be greater than 0".to_string(),
            });
        }

        for (key, timeout_ms) in [
            ("database.timeout_ms", self.database.timeout_ms),
            ("cache.timeout_ms", self.cache.timeout_ms),
            ("liveness.timeout_ms", self.liveness.timeout_ms),
        ] {
            if timeout_ms == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "timeout must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn liveness_url(&self) -> String {
        if self.liveness.url.is_empty() {
            format!("http://127.0.0.1:{}/health", self.server.port)
        } else {
            self.liveness.url.clone()
        }
    }
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Half the check budget, so a saturated pool fails the check with its own
    /// error before the runner gives up on it.
    pub fn acquire_timeout(&self) -> Duration {
        self.timeout() / 2
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_seconds)
    }
}

impl LivenessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
