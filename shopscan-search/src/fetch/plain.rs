//! Plain-http fetch strategy.
//!
//! One GET per attempt with a fresh browser identity, after a randomised
//! pacing delay. 503 answers are retried with exponential back-off; every
//! other failure is returned on the first occurrence.

use rand::Rng;
use std::time::Duration;

use super::retry::retry_with_backoff;
use super::PageFetcher;
use crate::adapter::SiteAdapter;
use crate::config::SearchConfig;
use crate::error::{FetchError, SearchError};
use crate::http;
use crate::types::{FetchResult, FetchedPage};

/// Fetches server-rendered result pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: SearchConfig,
}

impl HttpFetcher {
    /// Build a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails
    /// [`SearchConfig::validate`] or the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(config).map_err(|e| SearchError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// GET `url`, pacing and retrying per the configured policy.
    pub async fn fetch_url(&self, url: &str) -> FetchResult {
        request_delay(self.config.request_delay_ms).await;

        let html = retry_with_backoff(self.config.max_attempts, self.config.backoff_base_ms, || {
            self.attempt(url)
        })
        .await?;

        Ok(FetchedPage {
            url: url.to_owned(),
            html,
        })
    }

    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(http::identity_headers(&self.config))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "site answered with error status");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(classify)?;
        tracing::trace!(url, bytes = html.len(), "response received");
        Ok(html)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, adapter: &SiteAdapter, query: &str) -> FetchResult {
        self.fetch_url(&adapter.query_url(query)).await
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Sleep for a random duration within `(min, max)` milliseconds.
///
/// Bounds given in the wrong order are swapped.
async fn request_delay((a, b): (u64, u64)) {
    let (min, max) = (a.min(b), a.max(b));
    if max == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(min..=max);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
