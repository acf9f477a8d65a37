//! Configuration management for the booking wizard.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tourbook_runtime::RetryPolicy;

/// Which collaborators the wizard talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory mocks
    Mock,
    /// The REST backend at `api_url`
    Http,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown backend '{other}' (expected mock or http)")),
        }
    }
}

/// Retry settings for collaborator calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per call, including the first (1 = at-most-once)
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Cap on the delay between retries, in milliseconds
    pub max_delay_ms: u64,
}

/// Booking wizard configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: String,
    /// Image upload endpoint
    pub upload_url: String,
    /// Collaborators to use
    pub backend: Backend,
    /// Retry settings
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            upload_url: "http://localhost:3000/api/image".to_string(),
            backend: Backend::Mock,
            retry: RetryConfig {
                max_attempts: 1,
                initial_delay_ms: 500,
                max_delay_ms: 8000,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to [`Config::default`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (used by `from_env` and tests)
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_url: lookup("BOOKING_API_URL").unwrap_or(defaults.api_url),
            upload_url: lookup("BOOKING_UPLOAD_URL").unwrap_or(defaults.upload_url),
            backend: lookup("BOOKING_BACKEND")
                .and_then(|s| {
                    s.parse()
                        .inspect_err(|error| tracing::warn!(%error, "Ignoring BOOKING_BACKEND"))
                        .ok()
                })
                .unwrap_or(defaults.backend),
            retry: RetryConfig {
                max_attempts: lookup("BOOKING_RETRY_MAX_ATTEMPTS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.max_attempts),
                initial_delay_ms: lookup("BOOKING_RETRY_INITIAL_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.initial_delay_ms),
                max_delay_ms: lookup("BOOKING_RETRY_MAX_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.max_delay_ms),
            },
        }
    }

    /// The retry policy described by this configuration
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(self.retry.max_attempts)
            .initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .build()
    }
}
