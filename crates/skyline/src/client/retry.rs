//! Bounded retry loop with a fixed inter-attempt delay.
//!
//! The budget is a plain value handed to each call, so concurrent calls never
//! share or drain each other's retries.

use std::future::Future;
use std::time::Duration;

use skyline_common::error::ClientError;

use crate::client::classify::classify;
use crate::client::error::{Error, Result};

/// Retry budget and delay for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_retries` re-attempts after the first, `delay` apart.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Re-attempts allowed after the first.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds, fails terminally, or the budget is spent.
    ///
    /// `op` is invoked afresh for each attempt and must not depend on having run
    /// before. Terminal failures come back as [`Error::Call`]; transient ones that
    /// outlast the budget as [`Error::TransientUpstream`].
    pub async fn call<T, F, Fut>(&self, context: impl Into<String>, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ClientError>>,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let class = classify(&err);
            if !class.is_transient() {
                return Err(Error::Call {
                    context: context.into(),
                    source: err,
                });
            }
            if attempts > self.max_retries {
                let context = context.into();
                #[cfg(feature = "tracing")]
                tracing::warn!(%context, attempts, ?class, "retry budget exhausted");
                return Err(Error::TransientUpstream {
                    context,
                    attempts,
                    class,
                    source: err,
                });
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts, ?class, delay = ?self.delay, "transient failure, retrying");
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::classify::{ErrorClass, TerminalKind};
    use http::StatusCode;
    use skyline_common::error::HttpError;
    use skyline_common::xrpc::GenericXrpcError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn upstream_failure() -> ClientError {
        ClientError::Http(HttpError {
            status: StatusCode::BAD_GATEWAY,
            body: None,
        })
    }

    fn not_found() -> ClientError {
        ClientError::Xrpc(GenericXrpcError {
            error: "InvalidRequest".into(),
            message: Some("Profile not found".into()),
            nsid: "app.bsky.actor.getProfile",
            method: "GET",
            http_status: StatusCode::BAD_REQUEST,
        })
    }

    /// Fails transiently `failures` times, then yields the attempt number.
    async fn flaky(calls: &AtomicU32, failures: u32) -> std::result::Result<u32, ClientError> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= failures {
            Err(upstream_failure())
        } else {
            Ok(n)
        }
    }

    #[tokio::test]
    async fn succeeds_within_budget() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let out = policy.call("flaky", || flaky(&calls, 3)).await.unwrap();
        assert_eq!(out, 4);

        // the next call starts with the full budget again
        let calls = AtomicU32::new(0);
        let out = policy.call("flaky", || flaky(&calls, 3)).await.unwrap();
        assert_eq!(out, 4);
    }

    #[tokio::test]
    async fn budget_exhausted_wraps_transient() {
        let policy = RetryPolicy::new(1, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let err = policy
            .call("error getting post record", || flaky(&calls, 2))
            .await
            .unwrap_err();
        match err {
            Error::TransientUpstream {
                context,
                attempts,
                class,
                ..
            } => {
                assert_eq!(context, "error getting post record");
                assert_eq!(attempts, 2);
                assert_eq!(class, ErrorClass::TransientUpstream);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn terminal_is_not_retried() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let err = policy
            .call("error getting profile", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(not_found())
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, Error::Call { ref context, .. } if context == "error getting profile"));
        assert_eq!(err.class(), ErrorClass::Terminal(TerminalKind::NotFound));
    }

    #[tokio::test]
    async fn zero_budget_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let err = RetryPolicy::none()
            .call("once", || flaky(&calls, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransientUpstream { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        policy.call("slow", || flaky(&calls, 1)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
