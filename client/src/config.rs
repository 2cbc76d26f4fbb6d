//! # Client Configuration
//!
//! Tunables for the API client, loaded from environment variables with sane
//! defaults and validated before a client is built.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `WALLET_API_URL` | `http://127.0.0.1:3001` | Backend base URL |
//! | `WALLET_API_PLATFORM` | host OS | `X-Platform` header value |
//! | `WALLET_API_TIMEOUT_SECS` | 25 | Timeout for normal requests |
//! | `WALLET_API_REFRESH_TIMEOUT_SECS` | 10 | Timeout for the token refresh call |
//! | `WALLET_API_CACHE_TTL_SECS` | 30 | Lifetime of cached GET responses |
//! | `WALLET_API_CACHE_CAPACITY` | 256 | Max cached responses (LRU eviction) |
//! | `WALLET_API_CACHE_SWEEP_SECS` | 60 | Expired-entry sweep interval |
//! | `WALLET_API_DEDUP_WINDOW_MS` | 1000 | Window for sharing in-flight requests |
//! | `WALLET_API_MAX_RETRIES` | 3 | Additional attempts after the first |
//! | `WALLET_API_RETRY_BASE_MS` | 1000 | First backoff delay, doubled per retry |
//! | `WALLET_API_REFRESH_COOLDOWN_SECS` | 5 | Minimum gap between token refreshes |
//! | `WALLET_LOG_DIR` | `logs` | Directory for rolling log files |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001";

/// API client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub platform: String,
    pub request_timeout: Duration,
    pub refresh_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub cache_sweep_interval: Duration,
    pub dedup_window: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub refresh_cooldown: Duration,
    pub log_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            platform: env::consts::OS.to_string(),
            request_timeout: Duration::from_secs(25),
            refresh_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 256,
            cache_sweep_interval: Duration::from_secs(60),
            dedup_window: Duration::from_millis(1000),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
            refresh_cooldown: Duration::from_secs(5),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            base_url: env::var("WALLET_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            platform: env::var("WALLET_API_PLATFORM").unwrap_or(defaults.platform),
            request_timeout: env_secs("WALLET_API_TIMEOUT_SECS", defaults.request_timeout)?,
            refresh_timeout: env_secs("WALLET_API_REFRESH_TIMEOUT_SECS", defaults.refresh_timeout)?,
            cache_ttl: env_secs("WALLET_API_CACHE_TTL_SECS", defaults.cache_ttl)?,
            cache_capacity: env_parse("WALLET_API_CACHE_CAPACITY", defaults.cache_capacity)?,
            cache_sweep_interval: env_secs(
                "WALLET_API_CACHE_SWEEP_SECS",
                defaults.cache_sweep_interval,
            )?,
            dedup_window: env_millis("WALLET_API_DEDUP_WINDOW_MS", defaults.dedup_window)?,
            max_retries: env_parse("WALLET_API_MAX_RETRIES", defaults.max_retries)?,
            retry_base_delay: env_millis("WALLET_API_RETRY_BASE_MS", defaults.retry_base_delay)?,
            refresh_cooldown: env_secs(
                "WALLET_API_REFRESH_COOLDOWN_SECS",
                defaults.refresh_cooldown,
            )?,
            log_dir: env::var("WALLET_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() || self.refresh_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache capacity must be at least 1".to_string()));
        }
        if self.cache_sweep_interval.is_zero() {
            return Err(ConfigError::Invalid("cache sweep interval must be greater than zero".to_string()));
        }
        if self.max_retries > 10 {
            return Err(ConfigError::Invalid("max retries must be between 0 and 10".to_string()));
        }
        Ok(())
    }

    /// Absolute URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn env_parse<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

fn env_secs(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    env_parse(name, default.as_secs()).map(Duration::from_secs)
}

fn env_millis(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    env_parse(name, default.as_millis() as u64).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout, Duration::from_secs(25));
        assert_eq!(config.refresh_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.dedup_window, Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ClientConfig {
            cache_capacity: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_for_joins_path() {
        let config = ClientConfig {
            base_url: "https://api.example.com".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.url_for("/api/contacts"), "https://api.example.com/api/contacts");
    }
}
