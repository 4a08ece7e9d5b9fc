//! Process configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;
use yatube_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Limit/offset pagination bounds for list endpoints.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size used when `offset` is given without `limit`.
    pub default_limit: u64,
    /// Upper bound applied to any requested `limit`.
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub persistent: bool,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `JWT_SECRET` was unset and the insecure dev secret is in use.
    pub jwt_secret_defaulted: bool,
    pub log_format: LogFormat,
    pub pagination: PaginationConfig,
    pub storage: StorageConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        // Logging is not up yet; `main` reports the fallback once it is.
        let (jwt_secret, jwt_secret_defaulted) = match lookup("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Json)?;

        let defaults = PaginationConfig::default();
        let pagination = PaginationConfig {
            default_limit: parse_or(&lookup, "DEFAULT_PAGE_LIMIT", defaults.default_limit)?,
            max_limit: parse_or(&lookup, "MAX_PAGE_LIMIT", defaults.max_limit)?,
        };
        if pagination.default_limit == 0 || pagination.max_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_PAGE_LIMIT",
                reason: "page limits must be positive".to_string(),
            });
        }
        if pagination.default_limit > pagination.max_limit {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_LIMIT",
                reason: format!(
                    "{} exceeds MAX_PAGE_LIMIT ({})",
                    pagination.default_limit, pagination.max_limit
                ),
            });
        }

        let persistent = parse_or(&lookup, "USE_PERSISTENT_STORES", false)?;
        let database_url = lookup("DATABASE_URL");
        if persistent && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        let storage = StorageConfig {
            persistent,
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_defaulted,
            log_format,
            pagination,
            storage,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
