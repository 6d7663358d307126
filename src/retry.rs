use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{matches::MatchError, stats::StatsError};

/// Errors that can tell whether trying again might help
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for MatchError {
    fn is_retryable(&self) -> bool {
        MatchError::is_retryable(self)
    }
}

impl Retryable for StatsError {
    fn is_retryable(&self) -> bool {
        StatsError::is_retryable(self)
    }
}

/// Exponential backoff with jitter for transient store failures.
///
/// Conflicts, validation and authorization errors are returned on the first
/// attempt; only errors reporting `is_retryable` are tried again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(operation, attempt, error = %err, "Giving up");
                    return Err(err);
                }
            }
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let backoff = base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
        let jitter = if base_ms == 0 {
            0
        } else {
            rand::random::<u64>() % (base_ms + 1)
        };
        Duration::from_millis(backoff + jitter)
    }
}
