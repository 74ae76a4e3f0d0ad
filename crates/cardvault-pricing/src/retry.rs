//! Status classification and retry with exponential back-off.
//!
//! Every remote call goes through [`retry_with_backoff`], which spaces calls
//! with a fixed inter-call delay and retries transient failures on a
//! doubling schedule. Non-transient errors return immediately.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::PricingError;

/// How the transport layer treats an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// 429, 500, 502, 503, 504.
    Retryable,
    Permanent,
}

/// Classifies an HTTP status for the retry loop.
#[must_use]
pub fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        return StatusClass::Success;
    }
    match status.as_u16() {
        429 | 500 | 502 | 503 | 504 => StatusClass::Retryable,
        _ => StatusClass::Permanent,
    }
}

/// Attempt and pacing settings for one client.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first. Clamped to at least 1.
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
    /// Slept before every attempt, successful or not.
    pub inter_call_delay: Duration,
}

/// Runs `operation` up to `policy.max_attempts` times.
///
/// Back-off schedule with `backoff_base_secs = 2`:
///
/// | After failed attempt | Sleep   |
/// |----------------------|---------|
/// | 1                    | 2 s     |
/// | 2                    | 4 s     |
/// | 3                    | 8 s     |
///
/// Each retry increments `retries`, which callers surface in run statistics.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    retries: &AtomicU64,
    mut operation: F,
) -> Result<T, PricingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PricingError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        if !policy.inter_call_delay.is_zero() {
            tokio::time::sleep(policy.inter_call_delay).await;
        }

        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_transient() || attempt >= max_attempts {
            return Err(err);
        }

        let delay_secs = policy
            .backoff_base_secs
            .saturating_mul(1u64 << (attempt - 1).min(32));
        tracing::warn!(
            attempt,
            max_attempts,
            delay_secs,
            error = %err,
            "transient pricing API error, retrying after backoff"
        );
        retries.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff_base_secs: 0,
            inter_call_delay: Duration::ZERO,
        }
    }

    fn unavailable() -> PricingError {
        PricingError::Transient {
            status: 503,
            endpoint: "/products".to_owned(),
        }
    }

    #[test]
    fn classifies_retryable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(classify_status(status), StatusClass::Retryable, "{code}");
        }
    }

    #[test]
    fn classifies_permanent_statuses() {
        for code in [400u16, 401, 403, 404, 501, 505] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(classify_status(status), StatusClass::Permanent, "{code}");
        }
    }

    #[test]
    fn classifies_success() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Success);
        assert_eq!(classify_status(StatusCode::NO_CONTENT), StatusClass::Success);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &retries, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, PricingError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(retries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &retries, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(unavailable())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "3 attempts total");
        assert_eq!(retries.load(Ordering::SeqCst), 2);
        assert!(matches!(
            result,
            Err(PricingError::Transient { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &retries, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(unavailable())
                } else {
                    Ok::<u32, PricingError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(retries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_status() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &retries, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(PricingError::UnexpectedStatus {
                    status: 404,
                    endpoint: "/product".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(retries.load(Ordering::SeqCst), 0);
        assert!(matches!(
            result,
            Err(PricingError::UnexpectedStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &retries, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                let e = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                Err::<u32, _>(PricingError::Deserialize {
                    context: "test".to_owned(),
                    source: e,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PricingError::Deserialize { .. })));
    }

    #[tokio::test]
    async fn zero_max_attempts_still_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = AtomicU64::new(0);
        let c = Arc::clone(&calls);
        let _ = retry_with_backoff(policy(0), &retries, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(unavailable())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_from_base() {
        let started = tokio::time::Instant::now();
        let retries = AtomicU64::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff_base_secs: 2,
            inter_call_delay: Duration::ZERO,
        };
        let _ = retry_with_backoff(policy, &retries, || async {
            Err::<u32, _>(unavailable())
        })
        .await;
        // 2 s after the first failure, 4 s after the second.
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7),
            "unexpected total backoff: {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn inter_call_delay_precedes_every_attempt() {
        let started = tokio::time::Instant::now();
        let retries = AtomicU64::new(0);
        let policy = RetryPolicy {
            max_attempts: 2,
            backoff_base_secs: 0,
            inter_call_delay: Duration::from_millis(500),
        };
        let _ = retry_with_backoff(policy, &retries, || async {
            Err::<u32, _>(unavailable())
        })
        .await;
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1500),
            "unexpected pacing: {elapsed:?}"
        );
    }
}
