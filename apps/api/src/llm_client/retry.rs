//! Generic retry with exponential backoff and jitter.
//!
//! The policy is an explicit value handed to whoever needs retries, so the
//! backoff shape lives in one place instead of inside each client.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Retry policy: attempt count, backoff base, jitter, and the HTTP status
/// codes that are retryable beyond the always-retryable 5xx range.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: Duration,
    pub retry_statuses: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            jitter: Duration::from_millis(250),
            retry_statuses: &[429],
        }
    }
}

impl RetryPolicy {
    /// Whether a response status warrants another attempt.
    pub fn retries_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status) || (500..=599).contains(&status)
    }

    /// Backoff before attempt `attempt` (1-based): base * 2^(attempt-1)
    /// plus uniform jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let backoff = self.base_delay.saturating_mul(1 << exp);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Runs `op` until it succeeds, the error is not retryable, or the policy's
/// attempts are exhausted.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retryable failure: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
