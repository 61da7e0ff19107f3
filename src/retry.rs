//! Backoff policy and the sleep abstraction used between attempts.

use async_trait::async_trait;
use std::time::Duration;

fn as_millis_u64(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

/// Configurable exponential backoff policy.
///
/// The default reproduces the classic schedule: 5 total attempts with a
/// delay of `2^attempt` seconds before each retry (attempt 0-indexed), so a
/// fully exhausted call waits 1 + 2 + 4 + 8 = 15 seconds across its retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied to the delay after each attempt.
    pub multiplier: u32,
    /// Total attempts, including the initial one. Never less than 1.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff delay preceding retry `attempt` (0-indexed).
    ///
    /// Saturates instead of overflowing for absurd attempt counts.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(attempt.min(20));
        Duration::from_millis(as_millis_u64(self.base_delay).saturating_mul(factor))
    }
}

/// Abstracts the wait between attempts so tests can observe backoff without
/// real wall-clock delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Default [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
