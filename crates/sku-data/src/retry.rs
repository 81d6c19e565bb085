//! Retry policies for store operations.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u64.saturating_pow(attempt);
                let delay =
                    Duration::from_millis((base.as_millis() as u64).saturating_mul(multiplier));
                std::cmp::min(delay, *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Fixed(Duration::from_millis(100))
    }
}

/// Outcome of a retry loop that never saw a success.
///
/// Exhaustion is an ordinary value, not a panic: callers must handle
/// "the operation never succeeded" as a first-class result.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        last: E,
    },

    /// The overall deadline elapsed before the attempts ran out.
    #[error("deadline exceeded after {attempts} attempts: {last}")]
    DeadlineExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        last: E,
    },
}

impl<E> RetryError<E> {
    /// The error from the last attempt, whichever way the loop ended.
    pub fn last(&self) -> &E {
        match self {
            Self::Exhausted { last, .. } | Self::DeadlineExceeded { last, .. } => last,
        }
    }
}

/// Bounded retry for fallible operations.
///
/// Delays suspend only the calling task (`tokio::time::sleep`), and the
/// whole loop can be cancelled by dropping the future.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff strategy between attempts.
    pub backoff: BackoffStrategy,
    /// Optional budget for the whole loop, delays included.
    pub deadline: Option<Duration>,
}

impl RetryPolicy {
    /// Create a new retry policy with the default backoff.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: BackoffStrategy::default(),
            deadline: None,
        }
    }

    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::None,
            deadline: None,
        }
    }

    /// The policy used for store traffic: ten attempts, 100ms apart.
    pub fn store_default() -> Self {
        Self::new(10)
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Set an overall deadline across all attempts.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run `op` until it succeeds or the policy gives up.
    ///
    /// Each failed attempt is logged and followed by the backoff delay.
    /// The error is never rethrown mid-loop; after the final attempt it is
    /// returned inside [`RetryError`].
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    let delay = self.backoff.delay_for_attempt(attempt - 1);
                    if let Some(deadline) = self.deadline {
                        if started.elapsed() + delay >= deadline {
                            return Err(RetryError::DeadlineExceeded {
                                attempts: attempt,
                                last: err,
                            });
                        }
                    }

                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "operation failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::store_default()
    }
}
