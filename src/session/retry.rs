//! Bounded retry for single network calls

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts, including the first one
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Retries a fallible async operation a fixed number of times
///
/// A predicate decides whether a given failure is worth another attempt.
/// Non-retryable failures are returned immediately, without sleeping; the
/// failure of the last attempt is returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// A policy that performs exactly one attempt
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// runs out of attempts
    ///
    /// # Example
    ///
    /// ```no_run
    /// use custody_statement::RetryPolicy;
    ///
    /// # async fn example() -> Result<(), std::io::Error> {
    /// let policy = RetryPolicy::default();
    /// let value = policy
    ///     .run(|| async { Ok::<_, std::io::Error>(42) }, |_| true)
    ///     .await?;
    /// assert_eq!(value, 42);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    tracing::warn!(
                        "Attempt {}/{} failed, retrying in {:?}",
                        attempt,
                        attempts,
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.attempts, config.delay())
    }
}
