//! Retry policy for read-only remote calls
//!
//! Transient failures (transport hiccups, rate limiting) are retried after a
//! fixed delay; permanent failures (revert, missing on-chain method) are
//! re-raised immediately and unmodified. The loop is explicit and bounded by
//! an optional attempt ceiling: the source behavior of retrying forever is a
//! latent liveness risk, so `max_attempts` is exposed for deployments that
//! need a hard stop.

use std::{future::Future, time::Duration};

use tracing::warn;

use crate::errors::CallError;

/// Fixed delay between attempts when none is configured
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry-with-fixed-delay policy for read-only calls
///
/// Classification comes from the typed [`CallError`] returned by the
/// transport; the policy itself never inspects error text.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay between attempts
    pub delay: Duration,
    /// Attempt ceiling; `None` retries transient failures indefinitely
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    /// Invoke `op` until it succeeds, fails permanently, or exhausts attempts
    ///
    /// One call is in flight at a time, so retrying cannot reorder results.
    /// When `max_attempts` is exhausted the last transient error is surfaced.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_permanent() => return Err(err),
                Err(err) => {
                    attempt += 1;
                    if let Some(max) = self.max_attempts {
                        if attempt >= max {
                            return Err(err);
                        }
                    }
                    warn!(attempt, error = %err, "transient call failure, retrying");
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
