//! HTTP page fetching with a browser user agent and bounded retries.

use rand::{rng, Rng};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use trendcast_core::config::CollectorSettings;
use trendcast_core::{AppError, AppResult};

/// Fetches page bodies for the collectors.
///
/// Transport failures, timeouts, HTTP 429 and 5xx are retried up to
/// `max_retries` times with exponential backoff. Any other non-2xx status
/// fails immediately.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl PageFetcher {
    pub fn new(settings: &CollectorSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        })
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// GET `url` and return the body as text.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> AppResult<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    tracing::debug!(
                        bytes = body.len(),
                        elapsed_ms = total_t0.elapsed().as_millis() as u64,
                        "Fetched page"
                    );
                    return Ok(body);
                }
                Err(failure) if !failure.transient => return Err(AppError::Fetch(failure.message)),
                Err(failure) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        tracing::error!(
                            attempt,
                            max = self.max_retries,
                            error = %failure.message,
                            "Fetch exhausted retries"
                        );
                        return Err(AppError::Fetch(failure.message));
                    }

                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %failure.message,
                        "Fetch failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure {
                message: format!("GET {} returned {}", url, status),
                transient: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::from_reqwest(url, e))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_ms = (delay.as_millis() as u64) / 4;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rng().random_range(0..=jitter_ms))
    }
}

struct FetchFailure {
    message: String,
    transient: bool,
}

impl FetchFailure {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        Self {
            message: format!("GET {} failed: {}", url, e),
            transient: e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_server;
    use std::sync::atomic::Ordering;

    fn fetcher(max_retries: u32) -> PageFetcher {
        let settings = CollectorSettings {
            timeout_secs: 5,
            max_retries,
            ..CollectorSettings::default()
        };
        PageFetcher::new(&settings)
            .unwrap()
            .with_delays(Duration::from_millis(1), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let (url, hits) = scripted_server(vec!["200 OK|<html>ok</html>"]).await;
        let body = fetcher(0).fetch(&url).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (url, hits) =
            scripted_server(vec!["503 Service Unavailable|", "200 OK|<p>second</p>"]).await;
        let body = fetcher(2).fetch(&url).await.unwrap();
        assert_eq!(body, "<p>second</p>");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_fails_without_retry() {
        let (url, hits) = scripted_server(vec!["404 Not Found|", "200 OK|late"]).await;
        let result = fetcher(3).fetch(&url).await;
        assert!(matches!(result, Err(AppError::Fetch(msg)) if msg.contains("404")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits) = scripted_server(vec![
            "500 Internal Server Error|",
            "500 Internal Server Error|",
            "200 OK|too late",
        ])
        .await;
        let result = fetcher(1).fetch(&url).await;
        assert!(matches!(result, Err(AppError::Fetch(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_is_capped() {
        let fetcher = fetcher(5).with_delays(Duration::from_millis(100), Duration::from_millis(400));
        assert!(fetcher.backoff(1) >= Duration::from_millis(100));
        assert!(fetcher.backoff(10) <= Duration::from_millis(500));
    }
}
