//! Application error types and handling

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure reported by a single probe.
///
/// These never escape the runner: each one is folded into the
/// `CheckResult` of the probe that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Dependency could not be reached.
    #[error("{0}")]
    Connection(String),

    /// Probe exceeded its timeout budget.
    #[error("timeout")]
    Timeout,

    /// Dependency answered, but not with what the probe expected.
    #[error("{0}")]
    Protocol(String),
}

impl CheckError {
    pub fn connection(message: impl Into<String>) -> Self {
        CheckError::Connection(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        CheckError::Protocol(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Connection(_) => "connection",
            CheckError::Timeout => "timeout",
            CheckError::Protocol(_) => "protocol",
        }
    }
}

impl From<sqlx::Error> for CheckError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => CheckError::Protocol(err.to_string()),
            sqlx::Error::PoolTimedOut => {
                CheckError::Connection("connection pool timed out".to_string())
            }
            _ => CheckError::Connection(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for CheckError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            CheckError::Connection(err.to_string())
        } else if err.is_timeout() {
            CheckError::Timeout
        } else {
            CheckError::Protocol(err.to_string())
        }
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CheckError::Timeout
        } else {
            CheckError::Connection(err.to_string())
        }
    }
}

/// Configuration problems. The only fatal error class: startup stops here.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("check '{0}' is already registered")]
    DuplicateCheck(String),

    #[error("invalid check '{name}': {reason}")]
    InvalidCheck { name: String, reason: String },

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_error_messages() {
        assert_eq!(CheckError::Timeout.to_string(), "timeout");
        assert_eq!(
            CheckError::connection("connection refused").to_string(),
            "connection refused"
        );
        assert_eq!(CheckError::protocol("HTTP 500").to_string(), "HTTP 500");
        assert_eq!(CheckError::protocol("x").kind(), "protocol");
    }

    #[test]
    fn test_sqlx_error_classification() {
        assert_eq!(CheckError::from(sqlx::Error::RowNotFound).kind(), "protocol");
        assert_eq!(CheckError::from(sqlx::Error::PoolTimedOut).kind(), "connection");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateCheck("database".to_string());
        assert_eq!(err.to_string(), "check 'database' is already registered");

        let err = ConfigError::Missing("DATABASE_URL");
        assert_eq!(err.to_string(), "missing required setting DATABASE_URL");
    }

    #[test]
    fn test_app_error_wraps_startup_failures() {
        let err = AppError::from(ConfigError::Missing("REDIS_URL"));
        assert_eq!(
            err.to_string(),
            "Configuration error: missing required setting REDIS_URL"
        );

        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"));
        assert!(matches!(err, AppError::IoError(_)));
    }
}
