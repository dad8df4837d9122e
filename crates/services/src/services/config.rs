//! Process configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

use super::slot_parser::DEFAULT_BRANDS;

const DEFAULT_DATABASE_URL: &str = "sqlite://mioflow.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SEARCH_LIMIT: i64 = 10;
const DEFAULT_ORDER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Closed list of catalog brands the slot parser recognises
    pub brands: Vec<String>,
    /// Upper bound on catalog rows a dialog search returns
    pub search_limit: i64,
    /// Bound on the whole order-creation transaction
    pub order_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            brands: DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            order_timeout: Duration::from_secs(DEFAULT_ORDER_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let brands = match get("MIOFLOW_BRANDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.brands,
        };

        let search_limit = match get("MIOFLOW_SEARCH_LIMIT") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "MIOFLOW_SEARCH_LIMIT",
                        value: raw,
                    });
                }
            },
            None => defaults.search_limit,
        };

        let order_timeout = match get("MIOFLOW_ORDER_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "MIOFLOW_ORDER_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => defaults.order_timeout,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            brands,
            search_limit,
            order_timeout,
        })
    }
}
