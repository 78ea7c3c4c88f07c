//! Bounded retry with a fixed delay
//!
//! Every venue call goes through [`RetryExecutor::run`]. Failures are not
//! classified: network, auth, rate-limit and venue logic errors are all
//! retried the same way.

use liquidator_core::Error;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Retry limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between consecutive failed attempts
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 { 15 }
fn default_delay_ms() -> u64 { 10_000 }

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// Every attempt failed. Carries the error from the last attempt.
#[derive(Debug, Error)]
#[error("{operation} failed after {attempts} attempts: {source}")]
pub struct RetriesExhausted {
    pub operation: &'static str,
    pub attempts: u32,
    #[source]
    pub source: Error,
}

impl RetriesExhausted {
    /// The last observed error
    pub fn last_error(&self) -> &Error {
        &self.source
    }
}

/// Runs fallible async operations under a [`RetryPolicy`]
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Invoke `op` until it succeeds or `max_attempts` calls have failed.
    ///
    /// Sleeps the configured delay between failures, never after the last one.
    /// A policy of zero attempts still makes one call.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, RetriesExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = liquidator_core::Result<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    error!("{} failed (attempt {}/{}): {}", operation, attempt, max_attempts, e);

                    if attempt >= max_attempts {
                        return Err(RetriesExhausted {
                            operation,
                            attempts: attempt,
                            source: e,
                        });
                    }

                    warn!("Retrying {}... ({}/{})", operation, attempt, max_attempts);
                    tokio::time::sleep(self.policy.delay()).await;
                    attempt += 1;
                }
            }
        }
    }
}
