//! Store configuration
//!
//! Loaded from environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DEVEVENT_MAX_CONNECTIONS`: pool size (default: 5)

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "DEVEVENT_MAX_CONNECTIONS";

/// Default maximum connections for the pool.
/// Kept low: one process, short request-scoped operations.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Startup configuration problems. Fatal; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set; define it in the environment or a .env file")]
    MissingDatabaseUrl,

    #[error("invalid DEVEVENT_MAX_CONNECTIONS value '{value}': expected a positive integer")]
    InvalidMaxConnections { value: String },
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    /// Config with an explicit connection string.
    pub fn new(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        let database_url = database_url.into().trim().to_owned();
        if database_url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(Self {
            database_url,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL_VAR).ok_or(ConfigError::MissingDatabaseUrl)?;
        let config = Self::new(url)?;

        match lookup(MAX_CONNECTIONS_VAR) {
            Some(raw) => {
                let max = raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ConfigError::InvalidMaxConnections { value: raw })?;
                Ok(config.with_max_connections(max))
            }
            None => Ok(config),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_url_is_fatal() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingDatabaseUrl
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(DATABASE_URL_VAR, "  ")])).unwrap_err(),
            ConfigError::MissingDatabaseUrl
        );
    }

    #[test]
    fn defaults_pool_size() {
        let config = Config::from_lookup(lookup(&[(DATABASE_URL_VAR, "postgres://db/dev")])).unwrap();
        assert_eq!(config.database_url, "postgres://db/dev");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn reads_pool_size() {
        let config = Config::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "postgres://db/dev"),
            (MAX_CONNECTIONS_VAR, "12"),
        ]))
        .unwrap();
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn rejects_bad_pool_size() {
        for raw in ["0", "-1", "many"] {
            let err = Config::from_lookup(lookup(&[
                (DATABASE_URL_VAR, "postgres://db/dev"),
                (MAX_CONNECTIONS_VAR, raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMaxConnections { .. }));
        }
    }
}
