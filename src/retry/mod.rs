use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Whether a failed remote call is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retry,
    Fatal,
}

/// Bounded exponential backoff around a single remote call.
///
/// The policy knows nothing about any concrete API: callers supply the
/// operation and a classify function over its error type.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_wait: Duration) -> Self {
        Self {
            max_retries,
            initial_wait,
        }
    }

    /// Wait before the retry following failure number `attempt` (0-based):
    /// `initial_wait * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_wait * 2u32.saturating_pow(attempt)
    }

    /// Drive `op` to completion, retrying failures classified `Retry` up to
    /// `max_retries` times (`max_retries + 1` attempts total). The last
    /// error is returned on exhaustion; `Fatal` errors return immediately.
    pub async fn run<T, E, F, Fut, C>(&self, mut op: F, classify: C) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        C: Fn(&E) -> Disposition,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if classify(&err) == Disposition::Fatal || attempt >= self.max_retries {
                        return Err(err);
                    }
                    let wait = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        "Retryable failure, waiting {:?} before retry {}/{}: {}",
                        wait, attempt, self.max_retries, err
                    );
                    sleep(wait).await;
                }
            }
        }
    }
}
