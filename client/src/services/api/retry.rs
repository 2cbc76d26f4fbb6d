//! # Retry With Exponential Backoff
//!
//! Wraps one HTTP exchange. Transport failures, 5xx and 429 are retried after
//! `base_delay * 2^n`; every other 4xx is returned immediately.
//!
//! ```text
//! attempt 0 ──fail──▶ sleep 1s ──▶ attempt 1 ──fail──▶ sleep 2s ──▶ attempt 2
//!           ──fail──▶ sleep 4s ──▶ attempt 3 ──fail──▶ error returned
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::ClientConfig;
use crate::core::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or retries run out.
    ///
    /// `op` receives the 0-indexed attempt number.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
