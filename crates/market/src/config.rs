//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MARKET_DATA_DIR` - Directory holding the collection files (default: `.market-data`)
//! - `MARKET_STUDENT_EMAIL_DOMAIN` - Domain new accounts must use (default: `my.utsa.edu`)
//! - `MARKET_SEED_ON_START` - Seed sample data on first start (default: `true`)
//! - `MARKET_LOAD_DELAY_MS` - Simulated latency before every read (default: `0`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    /// Directory holding `csv_<collection>.csv` files
    pub data_dir: PathBuf,
    /// Email domain required at registration (without the `@`)
    pub student_email_domain: String,
    /// Whether to seed sample data when the store has never been initialized
    pub seed_on_start: bool,
    /// Delay before every store read
    pub load_delay: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".market-data"),
            student_email_domain: "my.utsa.edu".to_owned(),
            seed_on_start: true,
            load_delay: Duration::ZERO,
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = lookup("MARKET_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);

        let student_email_domain = lookup("MARKET_STUDENT_EMAIL_DOMAIN")
            .map_or(defaults.student_email_domain, |d| {
                d.trim().trim_start_matches('@').to_ascii_lowercase()
            });
        if student_email_domain.is_empty() || !student_email_domain.contains('.') {
            return Err(ConfigError::InvalidEnvVar(
                "MARKET_STUDENT_EMAIL_DOMAIN".to_owned(),
                format!("not a domain: {student_email_domain:?}"),
            ));
        }

        let seed_on_start = match lookup("MARKET_SEED_ON_START") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "MARKET_SEED_ON_START".to_owned(),
                    format!("expected true or false, got {raw:?}"),
                )
            })?,
            None => defaults.seed_on_start,
        };

        let load_delay = match lookup("MARKET_LOAD_DELAY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("MARKET_LOAD_DELAY_MS".to_owned(), e.to_string())
                })?,
            None => defaults.load_delay,
        };

        Ok(Self {
            data_dir,
            student_email_domain,
            seed_on_start,
            load_delay,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarketConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MarketConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = MarketConfig::from_lookup(lookup(&[
            ("MARKET_DATA_DIR", "/tmp/market"),
            ("MARKET_STUDENT_EMAIL_DOMAIN", "@Example.EDU"),
            ("MARKET_SEED_ON_START", "no"),
            ("MARKET_LOAD_DELAY_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/market"));
        assert_eq!(config.student_email_domain, "example.edu");
        assert!(!config.seed_on_start);
        assert_eq!(config.load_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values() {
        let err = MarketConfig::from_lookup(lookup(&[("MARKET_LOAD_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "MARKET_LOAD_DELAY_MS"));

        let err = MarketConfig::from_lookup(lookup(&[("MARKET_SEED_ON_START", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = MarketConfig::from_lookup(lookup(&[("MARKET_STUDENT_EMAIL_DOMAIN", "edu")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
