use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;

use crate::service::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        RetryPolicy {
            enabled: config.enabled,
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_retry_interval: Duration::from_millis(config.max_retry_interval_ms),
        }
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
            || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
    }

    /// Exponential backoff for the given zero-based attempt, before jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_retry_interval)
    }

    /// Delay before the next attempt, or `None` once the budget is spent.
    /// A server supplied `Retry-After` replaces the computed backoff.
    pub fn next_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.enabled || attempt >= self.max_retries {
            return None;
        }
        let delay = match retry_after {
            Some(delay) => delay,
            None => {
                let base = self.backoff(attempt);
                let jitter = rand::thread_rng().gen_range(0.0..=0.2);
                base + base.mul_f64(jitter)
            }
        };
        Some(delay.min(self.max_retry_interval))
    }
}

/// Only the delay-seconds form of `Retry-After` is honoured.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    use super::*;

    fn enabled(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            enabled: true,
            max_retries,
            initial_backoff: Duration::from_millis(100),
            max_retry_interval: Duration::from_secs(1),
        }
    }

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::NOT_IMPLEMENTED, false)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::NOT_FOUND, false)]
    #[case(StatusCode::CONFLICT, false)]
    fn test_retryable_status(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(RetryPolicy::is_retryable_status(status), expected);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = enabled(10);
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
        assert_eq!(policy.backoff(4), Duration::from_secs(1));
        assert_eq!(policy.backoff(40), Duration::from_secs(1));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = enabled(10);
        for _ in 0..50 {
            let delay = policy.next_delay(1, None).unwrap();
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(240));
        }
    }

    #[test]
    fn test_budget_and_disabled() {
        let policy = enabled(2);
        assert!(policy.next_delay(0, None).is_some());
        assert!(policy.next_delay(1, None).is_some());
        assert!(policy.next_delay(2, None).is_none());

        let disabled = RetryPolicy::default();
        assert!(!disabled.enabled);
        assert!(disabled.next_delay(0, None).is_none());
    }

    #[test]
    fn test_retry_after_overrides_and_is_capped() {
        let policy = enabled(3);
        assert_eq!(
            policy.next_delay(0, Some(Duration::from_millis(300))),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            policy.next_delay(0, Some(Duration::from_secs(120))),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }
}
