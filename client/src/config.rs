//! Client configuration resolved once at startup.
//!
//! # Design
//! The base endpoint is read from the environment a single time and then
//! handed to `ApiClient` explicitly; nothing in the client looks it up on
//! its own. `from_lookup` takes any key lookup so tests can supply values
//! without touching the process environment.

use std::time::Duration;

use thiserror::Error;

pub const BASE_URL_VAR: &str = "GEOAI_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "GEOAI_API_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Immutable settings shared by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Used when a call does not pass its own timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match lookup(TIMEOUT_VAR).filter(|v| !v.is_empty()) {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
                Duration::from_millis(ms)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { base_url, timeout })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
