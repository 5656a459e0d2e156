//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Read listener, storage and logging settings from the environment.
//!
//! # Invariants
//! - Unset variables fall back to defaults; malformed ones are errors.

use smartnotes_core::{default_log_level, IdStrategy, StoreLocation};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PATH: &str = "smartnotes.sqlite3";

/// Configuration loading failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidIdStrategy(String),
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPort(value) => write!(f, "PORT must be a number 0-65535, got `{value}`"),
            Self::InvalidIdStrategy(value) => write!(
                f,
                "SMARTNOTES_ID_STRATEGY must be `time-random` or `uuid`, got `{value}`"
            ),
            Self::EmptyValue(key) => write!(f, "{key} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// File path, or `:memory:` for a throwaway store.
    pub db_path: String,
    pub log_level: String,
    /// Directory for rotating log files, relative to the working directory
    /// unless absolute; stderr when unset.
    pub log_dir: Option<String>,
    pub id_strategy: IdStrategy,
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let id_strategy = match lookup("SMARTNOTES_ID_STRATEGY") {
            Some(raw) => {
                IdStrategy::parse(&raw).ok_or(ConfigError::InvalidIdStrategy(raw))?
            }
            None => IdStrategy::default(),
        };

        Ok(Self {
            host: non_empty(&lookup, "SMARTNOTES_HOST")?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            db_path: non_empty(&lookup, "SMARTNOTES_DB_PATH")?
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            log_level: non_empty(&lookup, "SMARTNOTES_LOG_LEVEL")?
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_empty(&lookup, "SMARTNOTES_LOG_DIR")?,
            id_strategy,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_location(&self) -> StoreLocation {
        StoreLocation::from_config(&self.db_path)
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig};
    use smartnotes_core::{IdStrategy, StoreLocation};
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.db_path, "smartnotes.sqlite3");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.id_strategy, IdStrategy::TimeRandom);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("SMARTNOTES_HOST", "127.0.0.1"),
            ("SMARTNOTES_DB_PATH", ":memory:"),
            ("SMARTNOTES_ID_STRATEGY", "uuid"),
            ("SMARTNOTES_LOG_LEVEL", "warn"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.store_location(), StoreLocation::Memory);
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_eq!(
            config_from(&[("PORT", "http")]).unwrap_err(),
            ConfigError::InvalidPort("http".to_string())
        );
        assert!(matches!(
            config_from(&[("SMARTNOTES_ID_STRATEGY", "ulid")]).unwrap_err(),
            ConfigError::InvalidIdStrategy(_)
        ));
        assert_eq!(
            config_from(&[("SMARTNOTES_DB_PATH", " ")]).unwrap_err(),
            ConfigError::EmptyValue("SMARTNOTES_DB_PATH")
        );
    }
}
