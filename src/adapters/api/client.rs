//! Bookmaker HTTP Client - Rate-limited REST Client
//!
//! Wraps reqwest with a shared rate limiter, timeouts and retries for
//! every bookmaker request. One client is built from config in `main`
//! and handed to each adapter.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Configuration for the bookmaker HTTP client.
#[derive(Debug, Clone)]
pub struct BookmakerClientConfig {
  /// User-Agent header.
  pub user_agent: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Requests allowed per second across all adapters.
  pub max_requests_per_second: u32,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl Default for BookmakerClientConfig {
  fn default() -> Self {
    Self {
      user_agent: "sgm-scanner".to_string(),
      timeout: Duration::from_secs(15),
      max_requests_per_second: 4,
      max_retries: 2,
      retry_base_delay: Duration::from_millis(250),
    }
  }
}

impl BookmakerClientConfig {
  /// Client settings from the `[api]` and `[rate_limits]` sections.
  pub fn from_app(config: &AppConfig) -> Self {
    Self {
      user_agent: config.api.user_agent.clone(),
      timeout: Duration::from_secs(config.api.timeout_seconds),
      max_requests_per_second: config.rate_limits.max_requests_per_second,
      max_retries: config.rate_limits.max_retries,
      retry_base_delay: Duration::from_millis(config.rate_limits.retry_base_delay_ms),
    }
  }
}

/// Rate-limited HTTP client shared by all bookmaker adapters.
pub struct BookmakerClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: BookmakerClientConfig,
  /// Request pacing.
  limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl BookmakerClient {
  /// Create a new bookmaker client.
  pub fn new(config: BookmakerClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let rps = NonZeroU32::new(config.max_requests_per_second)
      .context("max_requests_per_second must be positive")?;
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));

    Ok(Self {
      http,
      config,
      limiter,
    })
  }

  /// GET a URL and decode the JSON body.
  pub async fn get_json<T: DeserializeOwned>(
    &self,
    url: &str,
    headers: &[(&'static str, &str)],
  ) -> Result<T> {
    let mut request = self.http.get(url).header("Accept", "application/json");
    for (name, value) in headers {
      request = request.header(*name, *value);
    }
    let response = self.execute_with_retry(request, "GET", url).await?;
    response
      .json()
      .await
      .with_context(|| format!("Failed to decode response from {url}"))
  }

  /// POST a JSON body and decode the JSON response.
  pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    url: &str,
    body: &B,
  ) -> Result<T> {
    let request = self.http.post(url).json(body);
    let response = self.execute_with_retry(request, "POST", url).await?;
    response
      .json()
      .await
      .with_context(|| format!("Failed to decode response from {url}"))
  }

  /// Execute request with rate limiting and retries.
  ///
  /// 429, 5xx and transport errors are retried with exponential
  /// backoff. Any other non-success status fails immediately.
  async fn execute_with_retry(
    &self,
    request: RequestBuilder,
    method: &str,
    url: &str,
  ) -> Result<Response> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(attempt, delay_ms = delay.as_millis(), url, "Retrying request");
        sleep(delay).await;
      }

      self.limiter.until_ready().await;

      let req = request
        .try_clone()
        .context("Failed to clone request")?;

      match req.send().await {
        Ok(response) => match response.status() {
          status if status.is_success() => return Ok(response),
          StatusCode::TOO_MANY_REQUESTS => {
            warn!(method, url, "Rate limited by bookmaker, backing off");
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(status = %status, method, url, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{method} {url} failed with {status}: {body}"));
          }
        },
        Err(e) => {
          warn!(error = %e, attempt, method, url, "Request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }
}
