//! Runtime configuration for the bet ledger.
//!
//! Values come from the process environment (after loading a `.env` file when
//! present) and can be overridden with the builder-style setters.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./bets.db?mode=rwc";

/// Methods created on first start when the methods table is empty.
pub const DEFAULT_SEED_METHODS: [&str; 2] = ["lay 0x1", "lay 1x0"];

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
            _ => {
                fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// sqlx connection URL, e.g. `sqlite:./bets.db?mode=rwc` or `sqlite::memory:`
    pub database_url: String,
    /// Upper bound of the connection pool (in-memory databases always use one)
    pub max_connections: u32,
    pub seed_methods: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            seed_methods: DEFAULT_SEED_METHODS.iter().map(|s| s.to_string()).collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Build a configuration from the environment.
    ///
    /// Recognized variables: `DATABASE_URL`, `BET_LEDGER_MAX_CONNECTIONS`,
    /// `BET_LEDGER_SEED_METHODS` (comma separated), `BET_LEDGER_LOG`,
    /// `BET_LEDGER_LOG_FORMAT`.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(raw) = lookup("BET_LEDGER_MAX_CONNECTIONS") {
            let value: u32 = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("invalid BET_LEDGER_MAX_CONNECTIONS '{}': {}", raw, e)
            })?;
            if value == 0 {
                anyhow::bail!("BET_LEDGER_MAX_CONNECTIONS must be at least 1");
            }
            config.max_connections = value;
        }
        if let Some(raw) = lookup("BET_LEDGER_SEED_METHODS") {
            config.seed_methods = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(level) = lookup("BET_LEDGER_LOG") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("BET_LEDGER_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Set the database URL.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set the methods seeded into an empty database.
    pub fn with_seed_methods(mut self, names: Vec<String>) -> Self {
        self.seed_methods = names;
        self
    }

    /// Whether the URL points at a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.seed_methods, vec!["lay 0x1", "lay 1x0"]);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_environment_overrides() {
        let config = LedgerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BET_LEDGER_MAX_CONNECTIONS", "2"),
            ("BET_LEDGER_SEED_METHODS", "back home, ,lay draw"),
            ("BET_LEDGER_LOG", "debug"),
            ("BET_LEDGER_LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.seed_methods, vec!["back home", "lay draw"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_pool_size() {
        assert!(LedgerConfig::from_lookup(lookup_from(&[("BET_LEDGER_MAX_CONNECTIONS", "lots")])).is_err());
        assert!(LedgerConfig::from_lookup(lookup_from(&[("BET_LEDGER_MAX_CONNECTIONS", "0")])).is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = LedgerConfig::default()
            .with_database_url("sqlite::memory:")
            .with_max_connections(1)
            .with_seed_methods(vec![]);
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert!(config.seed_methods.is_empty());
    }
}
