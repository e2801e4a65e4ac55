//! Retry with exponential backoff for flaky external APIs.

use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{error, warn};

use crate::error::{HarryError, Result};
use crate::sanitize::{API_RETRY_ATTEMPTS, API_RETRY_BACKOFF};

/// How often and how patiently to retry.
///
/// Attempt `n` (1-based) that fails with a retryable error waits
/// `base^n * unit_millis` milliseconds before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Exponential base.
    pub base: u64,
    /// Multiplier turning `base^n` into milliseconds.
    pub unit_millis: u64,
    /// Upper bound on a single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: API_RETRY_ATTEMPTS,
            base: API_RETRY_BACKOFF,
            unit_millis: 1000,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that waits only a millisecond between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base: 1,
            unit_millis: 1,
            max_delay: Duration::from_millis(1),
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.base.max(1))
            .factor(self.unit_millis)
            .max_delay(self.max_delay)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Runs `action` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are used up.
///
/// Only errors for which [`HarryError::is_retryable`] holds are retried.
/// When every attempt failed transiently the result is
/// [`HarryError::RetryExhausted`] wrapping the last error.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, operation: &str, mut action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts: u32 = 0;
    let outcome = RetryIf::spawn(
        policy.strategy(),
        || {
            attempts += 1;
            action()
        },
        |err: &HarryError| {
            let retry = err.is_retryable();
            if retry {
                warn!("{} attempt failed, retrying: {}", operation, err);
            }
            retry
        },
    )
    .await;

    match outcome {
        Ok(value) => Ok(value),
        Err(err) if err.is_retryable() => {
            error!("{} failed after {} attempts: {}", operation, attempts, err);
            Err(HarryError::RetryExhausted {
                operation: operation.to_string(),
                attempts,
                source: Box::new(err),
            })
        }
        Err(err) => Err(err),
    }
}
