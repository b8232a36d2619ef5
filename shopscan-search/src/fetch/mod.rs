//! Page retrieval for site adapters.
//!
//! [`PageFetcher`] is the seam between the aggregator and the network.
//! [`SiteFetcher`] is the production implementation: it dispatches each
//! adapter to [`HttpFetcher`] or [`BrowserFetcher`] according to the
//! adapter's [`FetchStrategy`].

pub mod browser;
pub mod plain;
pub(crate) mod retry;

pub use browser::BrowserFetcher;
pub use plain::HttpFetcher;

use crate::adapter::SiteAdapter;
use crate::config::SearchConfig;
use crate::error::{FetchError, SearchError};
use crate::types::{FetchResult, FetchStrategy};

/// Retrieves the raw search results page for one site.
///
/// Implementations never panic and never propagate: every failure is a
/// [`FetchError`] in the returned result. All implementations must be
/// `Send + Sync` so sites can be fetched concurrently.
pub trait PageFetcher: Send + Sync {
    /// Fetch the results page of `adapter` for `query`.
    ///
    /// `query` is the raw search term; the implementation renders and
    /// encodes the site URL via [`SiteAdapter::query_url`].
    fn fetch(
        &self,
        adapter: &SiteAdapter,
        query: &str,
    ) -> impl std::future::Future<Output = FetchResult> + Send;
}

/// Strategy-dispatching fetcher used for real searches.
///
/// Owns one HTTP client and one browser session limiter. A new instance
/// is built for every search, so nothing is shared between requests.
#[derive(Debug)]
pub struct SiteFetcher {
    http: HttpFetcher,
    browser: BrowserFetcher,
}

impl SiteFetcher {
    /// Build the fetchers for one search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails
    /// [`SearchConfig::validate`] or the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            browser: BrowserFetcher::new(config)?,
        })
    }
}

impl PageFetcher for SiteFetcher {
    async fn fetch(&self, adapter: &SiteAdapter, query: &str) -> FetchResult {
        tracing::debug!(
            site = adapter.name.as_str(),
            strategy = %adapter.fetch_strategy,
            "fetching results page"
        );
        match adapter.fetch_strategy {
            FetchStrategy::PlainHttp => self.http.fetch(adapter, query).await,
            FetchStrategy::RenderedBrowser => self.browser.fetch(adapter, query).await,
        }
    }
}
