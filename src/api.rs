//! Retry policies shared by the ingestion and analysis layers.
//!
//! A [`RetryPolicy`] is a value injected into the component that makes the
//! call, so production code can wait between attempts while tests run with
//! [`RetryPolicy::immediate`] and finish instantly.
//!
//! # Backoff strategies
//!
//! - [`Backoff::Fixed`]: the same delay after every failed attempt. Used by the
//!   batch summarizer (3 attempts, 2 seconds).
//! - [`Backoff::Exponential`]: `min(base * 2^(attempt-1), max) + jitter`. Used by
//!   the HTTP fetcher behind the source adapters.
//! - [`Backoff::None`]: retry immediately.
//!
//! No delay is applied after the final attempt.

use rand::{rng, Rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

/// How long to wait between two attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    None,
    Fixed(Duration),
    Exponential {
        base: Duration,
        max: Duration,
        /// Upper bound of the random jitter added to every delay.
        jitter: Duration,
    },
}

/// Bounded retry with a pluggable delay function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: usize,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Exponential backoff with random jitter, capped at `max`.
    pub fn exponential(max_attempts: usize, base: Duration, max: Duration, jitter: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base, max, jitter },
        }
    }

    /// Retry without waiting. Meant for tests.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::None,
        }
    }

    /// Delay to apply after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        match &self.backoff {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, max, jitter } => {
                let shift = attempt.saturating_sub(1).min(31) as u32;
                let delay = base.saturating_mul(1u32 << shift).min(*max);
                let jitter_ms = jitter.as_millis() as u64;
                if jitter_ms == 0 {
                    delay
                } else {
                    delay + Duration::from_millis(rng().random_range(0..=jitter_ms))
                }
            }
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the last error
    /// is returned together with the number of attempts made.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= max_attempts {
                        error!(
                            label,
                            attempt,
                            max = max_attempts,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "retries exhausted"
                        );
                        return Err(Exhausted { attempts: attempt, last_error: e });
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        label,
                        attempt,
                        max = max_attempts,
                        ?delay,
                        error = %e,
                        "attempt failed; retrying"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }
}

/// Returned by [`RetryPolicy::run`] when every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: usize,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for Exhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempts: {}", self.attempts, self.last_error)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Exhausted<E> {}
