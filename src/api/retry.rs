//! Retry logic utilities for provider API requests
//!
//! Exponential backoff between attempts and a timeout wrapper per attempt.
//! Only errors that [`FetchError::is_retryable`] accepts are retried.

use crate::config::ApiConfig;
use crate::errors::{FetchError, FetchResult};
use crate::observer::{ReportEvent, ReportObserver};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use smtp2go_usage::api::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(100);
/// let next = calculate_next_backoff(backoff, 2.0, 30);
/// assert_eq!(next, Duration::from_millis(200));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// How often and how patiently a request is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: usize,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_backoff_seconds: config.max_backoff_seconds,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy is exhausted
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    observer: &dyn ReportObserver,
    mut operation: F,
) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempts = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => return Err(error),
            Err(error) => {
                attempts += 1;
                if attempts > policy.max_retries {
                    if policy.max_retries == 0 {
                        return Err(error);
                    }
                    return Err(FetchError::MaxRetriesExceeded {
                        endpoint: endpoint.to_string(),
                        last_error: error.to_string(),
                    });
                }

                observer.observe(ReportEvent::RetryScheduled {
                    endpoint: endpoint.to_string(),
                    attempt: attempts,
                    backoff,
                    error,
                });
                sleep(backoff).await;

                backoff = calculate_next_backoff(
                    backoff,
                    policy.backoff_multiplier,
                    policy.max_backoff_seconds,
                );
            }
        }
    }
}

/// Bound a single request attempt by `timeout_seconds`
pub async fn execute_with_timeout<T, Fut>(
    timeout_seconds: u64,
    endpoint: &str,
    operation: Fut,
) -> FetchResult<T>
where
    Fut: Future<Output = FetchResult<T>>,
{
    match timeout(Duration::from_secs(timeout_seconds), operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            timeout_seconds,
            endpoint: endpoint.to_string(),
        }),
    }
}
