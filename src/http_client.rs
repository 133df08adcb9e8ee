// src/http_client.rs
use reqwest::{Client, Method, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::HttpClientError;

/// Fixed-window token bucket. Callers that exceed the budget block until the
/// window rolls over; requests are never dropped.
struct TokenBucket {
    calls_per_window: u32,
    window: Duration,
    state: Mutex<BucketState>,
}

struct BucketState {
    window_start: Instant,
    used: u32,
}

impl TokenBucket {
    fn new(calls_per_window: u32, window: Duration) -> Self {
        Self {
            calls_per_window: calls_per_window.max(1),
            window,
            state: Mutex::new(BucketState {
                window_start: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Blocks until a slot is available in the current window. Slots are
    /// consumed only at grant time, so a cancelled waiter releases nothing.
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                if now.duration_since(state.window_start) >= self.window {
                    state.window_start = now;
                    state.used = 0;
                }
                if state.used < self.calls_per_window {
                    state.used += 1;
                    return;
                }
                self.window - now.duration_since(state.window_start)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

/// HTTP client wrapper shared by every caller of the same external service.
/// Enforces a sustained call rate, retries transient failures with
/// exponential backoff and jitter, and classifies exhausted retries as
/// `Transient` versus non-retryable responses as `Permanent`.
#[derive(Clone)]
pub struct RateLimitedHttpClient {
    client: Client,
    bucket: Arc<TokenBucket>,
    max_retries: u32,
    retry_base_delay: Duration,
    timeout: Duration,
}

impl RateLimitedHttpClient {
    pub fn new(config: &HttpConfig, user_agent: &str) -> crate::models::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            bucket: Arc::new(TokenBucket::new(
                config.rate_limit_calls,
                Duration::from_millis(config.rate_limit_window_ms),
            )),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<Response, HttpClientError> {
        self.request(Method::GET, url, headers, None, None).await
    }

    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &serde_json::Value,
    ) -> Result<Response, HttpClientError> {
        self.request(Method::POST, url, headers, Some(body), None)
            .await
    }

    /// Sends one request through the shared bucket. Transient conditions
    /// (429, 5xx, timeouts, connection errors) retry up to the attempt cap;
    /// any other 4xx returns `Permanent` immediately.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, String)],
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                let jitter = Duration::from_millis(fastrand::u64(0..=250));
                debug!(
                    "Retrying {} {} (attempt {}/{}) after {:?}",
                    method,
                    url,
                    attempt + 1,
                    self.max_retries + 1,
                    backoff + jitter
                );
                tokio::time::sleep(backoff + jitter).await;
            }

            self.bucket.acquire().await;

            let mut request = self
                .client
                .request(method.clone(), url)
                .timeout(timeout.unwrap_or(self.timeout));
            for (name, value) in headers {
                request = request.header(*name, value);
            }
            if let Some(json) = body {
                request = request.json(json);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_error = format!("HTTP {} from {}", status, url);
                        warn!("Transient HTTP failure: {}", last_error);
                        continue;
                    }
                    let message = response.text().await.unwrap_or_default();
                    return Err(HttpClientError::Permanent {
                        status: status.as_u16(),
                        message: truncate(&message, 500),
                    });
                }
                Err(e) => {
                    if e.is_timeout() || e.is_connect() || e.is_request() {
                        last_error = e.to_string();
                        warn!("Transient network failure for {}: {}", url, last_error);
                        continue;
                    }
                    return Err(HttpClientError::Transient(e.to_string()));
                }
            }
        }

        Err(HttpClientError::Transient(format!(
            "retry budget exhausted for {}: {}",
            url, last_error
        )))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(max_retries: u32) -> HttpConfig {
        HttpConfig {
            rate_limit_calls: 100,
            rate_limit_window_ms: 1000,
            max_retries,
            retry_base_delay_ms: 10,
            timeout_seconds: 5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bucket_delays_burst_beyond_rate() {
        let bucket = TokenBucket::new(3, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..7 {
            bucket.acquire().await;
        }
        // 7 calls at 3/window need at least two full window rollovers.
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn bucket_grants_burst_within_rate() {
        let bucket = TokenBucket::new(3, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..3 {
            bucket.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(&test_config(3), "test-agent").unwrap();
        let response = client
            .get(&format!("{}/flaky", server.uri()), &[])
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn client_error_is_permanent_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(&test_config(3), "test-agent").unwrap();
        let err = client
            .get(&format!("{}/missing", server.uri()), &[])
            .await
            .unwrap_err();
        match err {
            HttpClientError::Permanent { status, .. } => assert_eq!(status, 404),
            other => panic!("expected permanent failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rate_limit_status_exhausts_to_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(&test_config(2), "test-agent").unwrap();
        let err = client
            .get(&format!("{}/limited", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
