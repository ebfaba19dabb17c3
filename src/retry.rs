//! Exponential backoff with jitter for outbound HTTP calls.
//!
//! The hosted inference endpoints answer `503` while a model is loading and
//! the public translate/TTS endpoints throttle bursts, so every collaborator
//! routes its request through [`Backoff::run`].
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```
//!
//! With `max_retries = 0` (the default) the operation runs exactly once.

use crate::config::RetryConfig;
use crate::error::Result;
use rand::{Rng, rng};
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Retries after the first attempt.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Cap on a single delay.
    max_delay: StdDuration,
}

impl Backoff {
    pub fn new(max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// A policy that never retries.
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(0, StdDuration::ZERO)
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds or the retry budget is spent.
    ///
    /// `what` names the operation in log lines.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match op().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                what,
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis() as u64,
                                error = %e,
                                "exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.delay_for(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        what,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            StdDuration::from_millis(config.base_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delay_doubles_and_caps() {
        let backoff = Backoff::new(5, StdDuration::from_secs(1));
        assert_eq!(backoff.delay_for(1), StdDuration::from_secs(1));
        assert_eq!(backoff.delay_for(2), StdDuration::from_secs(2));
        assert_eq!(backoff.delay_for(3), StdDuration::from_secs(4));
        assert_eq!(backoff.delay_for(10), StdDuration::from_secs(30));
    }

    #[tokio::test]
    async fn test_no_retries_runs_once() {
        let calls = AtomicUsize::new(0);
        let res: Result<()> = Backoff::none()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Inference("down".to_string())) }
            })
            .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let backoff = Backoff::new(3, StdDuration::ZERO);
        let res = backoff
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::Inference("loading".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(res, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
