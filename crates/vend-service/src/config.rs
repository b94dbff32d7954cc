//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once at startup, and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use vend_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use vend_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendConfig {
    /// SQLite database file (`:memory:` for an isolated in-memory store)
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// HS256 secret for signing bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Argon2 memory cost in KiB
    pub password_memory_kib: u32,

    /// Argon2 iteration count
    pub password_iterations: u32,

    /// Page size when a listing call gives no limit
    pub default_page_size: u32,
}

impl VendConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = VendConfig {
            database_path: lookup("VEND_DATABASE_PATH")
                .unwrap_or_else(|| "vend.db".to_string())
                .into(),

            db_max_connections: parse_var(&lookup, "VEND_DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: lookup("VEND_JWT_SECRET").unwrap_or_else(|| {
                // In production, this MUST be set via environment variable
                "vend-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: parse_var(&lookup, "VEND_JWT_LIFETIME_SECS", "31536000")?, // 1 year

            password_memory_kib: parse_var(&lookup, "VEND_PASSWORD_MEMORY_KIB", "19456")?,

            password_iterations: parse_var(&lookup, "VEND_PASSWORD_ITERATIONS", "2")?,

            default_page_size: parse_var(&lookup, "VEND_PAGE_SIZE", "10")?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "VEND_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.default_page_size == 0 || config.default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("VEND_PAGE_SIZE".to_string()));
        }

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("VEND_JWT_SECRET".to_string()));
        }

        Ok(config)
    }

    /// An isolated configuration for tests: in-memory store, cheap hashing.
    pub fn in_memory() -> Self {
        VendConfig {
            database_path: PathBuf::from(":memory:"),
            db_max_connections: 1,
            jwt_secret: "vend-test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            password_memory_kib: 8,
            password_iterations: 1,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(self.database_path.clone()).max_connections(self.db_max_connections)
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<VendConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VendConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("vend.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 31_536_000);
        assert_eq!(config.password_memory_kib, 19_456);
        assert_eq!(config.password_iterations, 2);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("VEND_DATABASE_PATH", "/var/lib/vend/vend.db"),
            ("VEND_JWT_SECRET", "s3cret"),
            ("VEND_PAGE_SIZE", "25"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/vend/vend.db"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.default_page_size, 25);
    }

    #[test]
    fn test_invalid_values() {
        let err = from_map(&[("VEND_JWT_LIFETIME_SECS", "forever")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "VEND_JWT_LIFETIME_SECS"));

        assert!(from_map(&[("VEND_PAGE_SIZE", "0")]).is_err());
        assert!(from_map(&[("VEND_PAGE_SIZE", "101")]).is_err());
        assert!(from_map(&[("VEND_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(from_map(&[("VEND_JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn test_in_memory_db_config() {
        let config = VendConfig::in_memory();
        assert_eq!(config.db_config().max_connections, 1);

        let file = from_map(&[("VEND_DB_MAX_CONNECTIONS", "3")]).unwrap();
        assert_eq!(file.db_config().max_connections, 3);
    }
}
