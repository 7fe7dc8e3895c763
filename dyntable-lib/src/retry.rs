//! Bounded retry with per-attempt timeout.
//!
//! The controller verification loop and any future network call share the
//! same combinator: a fixed attempt budget, a backoff between attempts and
//! an optional timeout that aborts each in-flight attempt.

use std::future::Future;
use std::time::Duration;

/// Linear backoff: one second times the attempt number.
pub fn linear_backoff(attempt: u32) -> Duration {
    Duration::from_millis(1000 * u64::from(attempt))
}

/// Retry settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dyntable_lib::retry::RetryPolicy;
///
/// let policy = RetryPolicy::new(3).per_attempt_timeout(Duration::from_secs(10));
/// assert_eq!(policy.max_attempts, 3);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay inserted after a failed attempt, as a function of the
    /// 1-based attempt number.
    pub backoff: fn(u32) -> Duration,
    /// Timeout applied to each attempt; `None` waits indefinitely.
    pub per_attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and linear backoff.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: linear_backoff,
            per_attempt_timeout: None,
        }
    }

    /// Sets the backoff function.
    pub fn backoff(mut self, backoff: fn(u32) -> Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn per_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.per_attempt_timeout = Some(timeout);
        self
    }
}

/// Why a single attempt failed.
#[derive(Debug)]
pub enum AttemptError<E> {
    /// The attempt exceeded the per-attempt timeout and was aborted.
    Timeout(Duration),
    /// The operation itself failed.
    Inner(E),
}

/// All attempts failed; carries the final attempt's error.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Attempts made.
    pub attempts: u32,
    /// The last attempt's error.
    pub last: AttemptError<E>,
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// The operation receives the 1-based attempt number. Failed attempts are
/// swallowed and retried after the policy's backoff; the last failure is
/// returned when the budget is exhausted.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last: Option<AttemptError<E>> = None;

    for attempt in 1..=max_attempts {
        let outcome = match policy.per_attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation(attempt)).await {
                Ok(result) => result.map_err(AttemptError::Inner),
                Err(_) => Err(AttemptError::Timeout(limit)),
            },
            None => operation(attempt).await.map_err(AttemptError::Inner),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) => {
                match &error {
                    AttemptError::Timeout(limit) => {
                        log::debug!("attempt {attempt}/{max_attempts} timed out after {limit:?}");
                    }
                    AttemptError::Inner(e) => {
                        log::debug!("attempt {attempt}/{max_attempts} failed: {e}");
                    }
                }
                last = Some(error);
                if attempt < max_attempts {
                    tokio::time::sleep((policy.backoff)(attempt)).await;
                }
            }
        }
    }

    Err(RetryExhausted {
        attempts: max_attempts,
        last: last.unwrap_or(AttemptError::Timeout(Duration::ZERO)),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::Ordering;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures_with_linear_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3);
        let start = tokio::time::Instant::now();

        let result = retry(&policy, |_| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("boom")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after attempt 1 plus 2s after attempt 2.
        assert!(start.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget() {
        let policy = RetryPolicy::new(2);
        let result: Result<(), _> = retry(&policy, |_| async { Err("nope") }).await;
        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 2);
        assert!(matches!(exhausted.last, AttemptError::Inner("nope")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_attempt() {
        let policy = RetryPolicy::new(2).per_attempt_timeout(Duration::from_secs(1));
        let result: Result<(), RetryExhausted<&str>> = retry(&policy, |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        let exhausted = result.unwrap_err();
        assert!(matches!(exhausted.last, AttemptError::Timeout(_)));
    }
}
