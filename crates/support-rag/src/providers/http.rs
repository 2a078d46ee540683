//! Shared HTTP plumbing for model providers: client construction, retries
//! with exponential backoff, and mapping of transport failures

use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Build a pooled client with a per-request timeout
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))
}

/// Map a send failure, turning client timeouts into [`Error::Timeout`]
pub fn send_error(operation: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(operation)
    } else {
        Error::Http(err)
    }
}

/// Fail on non-2xx responses, logging the body
pub async fn check_status(operation: &str, response: Response) -> Result<Response> {
    let failure = response.error_for_status_ref().err();
    if let Some(err) = failure {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} failed: HTTP {} - {}", operation, status, body);
        return Err(Error::Http(err));
    }
    Ok(response)
}

/// Retry settings for provider calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Run `operation`, retrying retryable failures with exponential backoff
    pub async fn run<F, Fut, T>(&self, name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        name,
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
