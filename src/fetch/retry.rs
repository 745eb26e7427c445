//! Retry policy around the page fetcher
//!
//! Up to `max_attempts` tries per URL. Transient failures wait a fixed short
//! delay and retry; session-corrupting failures rebuild the session first;
//! permanent failures (non-2xx, or retry exhaustion) are returned immediately
//! for the caller to record in the failure registry.

use crate::fetch::PageFetcher;
use crate::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps a fetcher with the crawl retry policy
pub struct RetryingFetcher<F> {
    inner: F,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<F: PageFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Access to the wrapped fetcher
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str, interactive: bool) -> Result<String, FetchError> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            match self.inner.fetch(url, interactive).await {
                Ok(text) => {
                    debug!(url, attempt, "fetch succeeded");
                    return Ok(text);
                }
                Err(e @ FetchError::Permanent { .. }) => {
                    warn!(url, attempt, error = %e, "permanent fetch failure");
                    return Err(e);
                }
                Err(FetchError::SessionCorrupted { reason, .. }) => {
                    warn!(url, attempt, %reason, "fetch session corrupted, restarting");
                    self.inner.restart_session().await;
                    last_reason = reason;
                }
                Err(FetchError::Transient { reason, .. }) => {
                    warn!(url, attempt, %reason, "transient fetch failure");
                    last_reason = reason;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(FetchError::Permanent {
            url: url.to_string(),
            reason: format!(
                "retries exhausted after {} attempts: {}",
                self.max_attempts, last_reason
            ),
        })
    }

    async fn restart_session(&self) {
        self.inner.restart_session().await
    }
}
