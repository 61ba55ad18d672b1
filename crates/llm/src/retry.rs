//! Retry decorator for generation clients.
//!
//! Transient failures (transport, timeout, HTTP 429/5xx) are retried with
//! exponential backoff plus random jitter:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
//! ```
//!
//! Permanent failures are returned on the first attempt.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmResult};
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Wraps any [`LlmClient`] with bounded retries.
pub struct RetryingClient<C> {
    inner: C,
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    max_jitter: Duration,
}

impl<C: LlmClient> RetryingClient<C> {
    /// Retry up to `max_retries` times starting at 500 ms, capped at 8 s.
    pub fn new(inner: C, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            max_jitter: Duration::from_millis(250),
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration, max_jitter: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self.max_jitter = max_jitter;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);

        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=jitter_ms)
        };
        delay + Duration::from_millis(jitter)
    }
}

impl<C> fmt::Debug for RetryingClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingClient")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

#[async_trait::async_trait]
impl<C: LlmClient> LlmClient for RetryingClient<C> {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.complete(request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_transient() => {
                    tracing::warn!(error = %e, "Generation failed permanently");
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if attempt > self.max_retries {
                        tracing::error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            error = %e,
                            "Generation exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "Generation attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmError, LlmUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted sequence of outcomes.
    struct ScriptedClient {
        outcomes: Mutex<Vec<LlmResult<LlmResponse>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(mut outcomes: Vec<LlmResult<LlmResponse>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(&self, _request: &LlmRequest) -> LlmResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::Malformed("script exhausted".into())))
        }
    }

    fn ok(text: &str) -> LlmResult<LlmResponse> {
        Ok(LlmResponse {
            content: text.to_string(),
            model: "scripted-model".to_string(),
            usage: LlmUsage::default(),
        })
    }

    fn fast(client: ScriptedClient, max_retries: u32) -> RetryingClient<ScriptedClient> {
        RetryingClient::new(client, max_retries).with_delays(
            Duration::from_millis(1),
            Duration::from_millis(2),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let client = fast(
            ScriptedClient::new(vec![
                Err(LlmError::Timeout),
                Err(LlmError::Status { status: 503, body: String::new() }),
                ok("done"),
            ]),
            2,
        );

        let response = client.complete(&LlmRequest::new("p")).await.unwrap();
        assert_eq!(response.content, "done");
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let client = fast(
            ScriptedClient::new(vec![Err(LlmError::Blank), ok("never")]),
            3,
        );

        let result = client.complete(&LlmRequest::new("p")).await;
        assert!(matches!(result, Err(LlmError::Blank)));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let client = fast(
            ScriptedClient::new(vec![
                Err(LlmError::Status { status: 429, body: String::new() }),
                Err(LlmError::Status { status: 429, body: String::new() }),
                Err(LlmError::Status { status: 429, body: String::new() }),
                ok("too late"),
            ]),
            2,
        );

        let result = client.complete(&LlmRequest::new("p")).await;
        assert!(matches!(result, Err(LlmError::Status { status: 429, .. })));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_is_capped() {
        let client = RetryingClient::new(ScriptedClient::new(vec![]), 10).with_delays(
            Duration::from_millis(500),
            Duration::from_secs(8),
            Duration::ZERO,
        );

        assert_eq!(client.backoff(1), Duration::from_millis(500));
        assert_eq!(client.backoff(2), Duration::from_secs(1));
        assert_eq!(client.backoff(5), Duration::from_secs(8));
        assert_eq!(client.backoff(40), Duration::from_secs(8));
    }
}
