//! Session configuration parsed from environment variables.

use std::time::Duration;

use crate::storage::StorageKeys;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_SESSION_SCOPE_PREFIX: &str = "session:";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_VERIFY_RETRIES: u32 = 0;
pub const DEFAULT_VERIFY_RETRY_DELAY_MS: u64 = 500;
pub const MAX_VERIFY_RETRY_DELAY_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for IdentityTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Retry behavior for transient verification failures.
///
/// `max_retries = 0` keeps the plain behavior: the first failure of any kind
/// clears the stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_VERIFY_RETRIES,
            initial_delay_ms: DEFAULT_VERIFY_RETRY_DELAY_MS,
            max_delay_ms: MAX_VERIFY_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (0-indexed), doubling and capped.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let delay_ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub storage_keys: StorageKeys,
    pub timeouts: IdentityTimeouts,
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            storage_keys: StorageKeys::default(),
            timeouts: IdentityTimeouts::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Build typed session config from environment variables.
    ///
    /// Optional:
    /// - `GAMEHUB_API_URL`: identity service base URL (default `http://localhost:5000`)
    /// - `GAMEHUB_TOKEN_KEY`: durable key for the bearer token (default `token`)
    /// - `GAMEHUB_SESSION_PREFIX`: namespace swept on logout (default `session:`)
    /// - `GAMEHUB_REQUEST_TIMEOUT_SECS`: default 10
    /// - `GAMEHUB_CONNECT_TIMEOUT_SECS`: default 5
    /// - `GAMEHUB_VERIFY_RETRIES`: default 0
    /// - `GAMEHUB_VERIFY_RETRY_DELAY_MS`: default 500
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a numeric value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            "GAMEHUB_API_URL",
            &std::env::var("GAMEHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let storage_keys = StorageKeys {
            token_key: std::env::var("GAMEHUB_TOKEN_KEY").unwrap_or_else(|_| DEFAULT_TOKEN_KEY.to_owned()),
            session_scope_prefix: std::env::var("GAMEHUB_SESSION_PREFIX")
                .unwrap_or_else(|_| DEFAULT_SESSION_SCOPE_PREFIX.to_owned()),
        };
        let timeouts = IdentityTimeouts {
            request_secs: env_parse("GAMEHUB_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("GAMEHUB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let retry = RetryPolicy {
            max_retries: env_parse("GAMEHUB_VERIFY_RETRIES", DEFAULT_VERIFY_RETRIES)?,
            initial_delay_ms: env_parse("GAMEHUB_VERIFY_RETRY_DELAY_MS", DEFAULT_VERIFY_RETRY_DELAY_MS)?,
            max_delay_ms: MAX_VERIFY_RETRY_DELAY_MS,
        };

        Ok(Self { api_base_url, storage_keys, timeouts, retry })
    }

    /// Replace the base URL, applying the same validation as `from_env`.
    /// `source` names where the value came from (a flag, a setting) and is
    /// reported as the error key.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not http(s).
    pub fn with_api_base_url(mut self, source: &'static str, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url(source, url)?;
        Ok(self)
    }
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::Invalid { key, value: raw.to_owned() })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
