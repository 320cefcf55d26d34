//! Retry scheduling with exponential backoff and endpoint rotation.

use std::future::Future;
use std::time::Duration;

use jetdrop_client::{ClientError, EndpointRotation};
use tracing::{debug, warn};

use crate::error::{DispatchError, Result};

/// Backoff parameters for a retried network operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; later delays double each time.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Policy for read calls: three attempts, 2s base delay.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
        }
    }

    /// Policy for transaction submission: five attempts, 3s base delay.
    pub fn sends() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
        }
    }

    /// Backoff before the attempt after `attempt` (1-based):
    /// `base_delay * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Attempt after which the client moves to its next endpoint.
    ///
    /// This is the midpoint of the budget, `max_attempts / 2`. A
    /// single-attempt policy never rotates.
    pub fn rotation_attempt(&self) -> u32 {
        self.max_attempts / 2
    }
}

/// Runs `operation` until it succeeds, returns a non-transient error, or
/// the attempt budget is spent.
///
/// Only errors classified transient by [`ClientError::is_transient`] are
/// retried; anything else is returned to the caller immediately, since
/// resubmitting a rejected transaction or a malformed request would fail
/// the same way every time. When the budget runs out the last transient
/// error is wrapped in [`DispatchError::RetriesExhausted`].
pub async fn run_with_retry<C, T, F, Fut>(
    policy: &RetryPolicy,
    client: &C,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    C: EndpointRotation,
    F: FnMut() -> Fut,
    Fut: Future<Output = jetdrop_client::Result<T>>,
{
    let budget = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = label, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() => {
                if attempt >= budget {
                    return Err(DispatchError::RetriesExhausted {
                        operation: label.to_string(),
                        attempts: budget,
                        last_error: error,
                    });
                }
                warn!(
                    operation = label,
                    attempt,
                    budget,
                    error = %error,
                    "transient failure, backing off"
                );
                if attempt == policy.rotation_attempt() {
                    let endpoint = client.rotate_endpoint();
                    warn!(operation = label, endpoint, "rotated to next endpoint");
                }
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(error) => return Err(DispatchError::Client(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedRotation {
        rotations: AtomicU32,
    }

    impl FixedRotation {
        fn new() -> Self {
            FixedRotation {
                rotations: AtomicU32::new(0),
            }
        }
    }

    impl EndpointRotation for FixedRotation {
        fn active_endpoint(&self) -> String {
            "https://primary.example/jsonRPC".to_string()
        }

        fn rotate_endpoint(&self) -> String {
            self.rotations.fetch_add(1, Ordering::SeqCst);
            "https://fallback.example/jsonRPC".to_string()
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    fn rate_limited() -> ClientError {
        ClientError::RateLimited {
            endpoint: "https://primary.example/jsonRPC".to_string(),
            message: "too many requests".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(3));
        assert_eq!(policy.delay_for(1), Duration::from_secs(3));
        assert_eq!(policy.delay_for(2), Duration::from_secs(6));
        assert_eq!(policy.delay_for(3), Duration::from_secs(12));
        assert_eq!(policy.delay_for(4), Duration::from_secs(24));
    }

    #[test]
    fn test_rotation_attempt_is_midpoint() {
        assert_eq!(RetryPolicy::sends().rotation_attempt(), 2);
        assert_eq!(RetryPolicy::default().rotation_attempt(), 1);
        assert_eq!(fast_policy(1).rotation_attempt(), 0);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let client = FixedRotation::new();
        let mut calls = 0u32;
        let result = run_with_retry(&fast_policy(5), &client, "read", || {
            calls += 1;
            let outcome = if calls < 3 { Err(rate_limited()) } else { Ok(42u32) };
            async move { outcome }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_rotates_once_at_midpoint() {
        let client = FixedRotation::new();
        let mut calls = 0u32;
        let result: Result<u32> = run_with_retry(&fast_policy(5), &client, "read", || {
            calls += 1;
            async { Err(rate_limited()) }
        })
        .await;
        assert!(matches!(
            result,
            Err(DispatchError::RetriesExhausted { attempts: 5, .. })
        ));
        assert_eq!(calls, 5);
        assert_eq!(client.rotations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_transient_error_not_retried() {
        let client = FixedRotation::new();
        let mut calls = 0u32;
        let result: Result<u32> = run_with_retry(&fast_policy(5), &client, "submit", || {
            calls += 1;
            async {
                Err(ClientError::SubmissionRejected {
                    status: 400,
                    message: "invalid boc".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(DispatchError::Client(_))));
        assert_eq!(calls, 1);
        assert_eq!(client.rotations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_attempt_policy_never_rotates() {
        let client = FixedRotation::new();
        let result: Result<u32> = run_with_retry(&fast_policy(1), &client, "read", || async {
            Err(rate_limited())
        })
        .await;
        assert!(matches!(
            result,
            Err(DispatchError::RetriesExhausted { attempts: 1, .. })
        ));
        assert_eq!(client.rotations.load(Ordering::SeqCst), 0);
    }
}
