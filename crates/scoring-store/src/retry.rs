//! Bounded retry for remote operations
//!
//! An operation is attempted up to `max_attempts` times. After failed
//! attempt `n` (starting at 1) the caller sleeps `base_delay * n` before the
//! next attempt. Only connection and timeout failures are retried.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::backend::BackendResult;
use crate::error::{Result, StoreError};

/// Default number of attempts per operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay unit between attempts
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Retry configuration for remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit, multiplied by the attempt number
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Upper bound of the time spent sleeping for one operation
    pub fn total_delay(&self) -> Duration {
        // base * (1 + 2 + ... + (n - 1))
        let n = u128::from(self.attempts());
        let nanos = self
            .base_delay
            .as_nanos()
            .checked_mul(n * (n - 1) / 2)
            .unwrap_or(u128::MAX);
        u64::try_from(nanos / NANOS_PER_SEC)
            .map(|secs| Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
            .unwrap_or(Duration::MAX)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` under this policy
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    tracing::warn!(operation, error = %err, "Store operation rejected");
                    return Err(StoreError::Backend(err));
                }
                Err(err) if attempt >= attempts => {
                    tracing::error!(
                        operation,
                        attempts,
                        error = %err,
                        "Store is not responding"
                    );
                    return Err(StoreError::Unavailable {
                        attempts,
                        last_error: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    tracing::info!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Could not reach store, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
