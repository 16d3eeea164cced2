//! Pluggable retry policy for gateway calls.

use std::time::Duration;

use crate::gateway::CompletionError;

/// Decides whether and when a failed completion call is tried again.
///
/// A policy is three things: a retry budget, a backoff function mapping the
/// attempt number to a delay, and a predicate selecting which errors are
/// worth retrying. The default reproduces the gateway's historical
/// behavior: three extra attempts, a fixed four-second delay, rate-limit
/// errors only. Callers wanting exponential backoff or a wider predicate
/// supply their own functions via [`RetryPolicy::new`] without touching the
/// gateway's call loop.
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Box<dyn Fn(u32) -> Duration + Send + Sync>,
    retryable: Box<dyn Fn(&CompletionError) -> bool + Send + Sync>,
}

impl RetryPolicy {
    /// Builds a policy from its three parts. `backoff` receives the
    /// one-based number of the attempt that just failed.
    pub fn new(
        max_retries: u32,
        backoff: impl Fn(u32) -> Duration + Send + Sync + 'static,
        retryable: impl Fn(&CompletionError) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self { max_retries, backoff: Box::new(backoff), retryable: Box::new(retryable) }
    }

    /// Fixed-delay policy retrying rate-limit errors only.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self::new(
            max_retries,
            move |_attempt| delay,
            |error| matches!(error, CompletionError::RateLimited),
        )
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Maximum number of retries after the initial attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// True when `error` should be retried given that `attempts_used`
    /// retries have already been spent.
    pub fn should_retry(&self, error: &CompletionError, attempts_used: u32) -> bool {
        attempts_used < self.max_retries && (self.retryable)(error)
    }

    /// Delay to sleep before retry number `attempt` (one-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(4))
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy").field("max_retries", &self.max_retries).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_retries_rate_limits_three_times() {
        let policy = RetryPolicy::default();
        let rate_limited = CompletionError::RateLimited;
        assert!(policy.should_retry(&rate_limited, 0));
        assert!(policy.should_retry(&rate_limited, 2));
        assert!(!policy.should_retry(&rate_limited, 3));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn default_policy_does_not_retry_other_failures() {
        let policy = RetryPolicy::default();
        let service = CompletionError::Service { status: 500, message: "boom".to_owned() };
        let transport = CompletionError::Transport("connection reset".to_owned());
        assert!(!policy.should_retry(&service, 0));
        assert!(!policy.should_retry(&transport, 0));
    }

    #[test]
    fn none_policy_never_retries() {
        let policy = RetryPolicy::none();
        assert!(!policy.should_retry(&CompletionError::RateLimited, 0));
    }

    #[test]
    fn custom_backoff_function_is_consulted() {
        let policy = RetryPolicy::new(
            5,
            |attempt| Duration::from_secs(u64::from(attempt) * 2),
            |_| true,
        );
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
        let service = CompletionError::Service { status: 503, message: String::new() };
        assert!(policy.should_retry(&service, 4));
        assert!(!policy.should_retry(&service, 5));
    }
}
