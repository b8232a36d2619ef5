//! # shopscan-search
//!
//! Multi-site product search for shopscan.
//!
//! Given a search term and a set of retail sites, this crate fetches each
//! site's search results page, extracts the first product's display fields
//! and returns one [`ProductRecord`] per site. It compiles into the
//! shopscan server as a library dependency.
//!
//! ## Design
//!
//! - Per-site [`SiteAdapter`]s are data: a query URL template, a fetch
//!   strategy and a CSS selector field map
//! - Server-rendered sites are fetched over plain HTTP with identity
//!   rotation, request pacing and 503 back-off
//! - Client-rendered sites are loaded in an isolated headless Chromium
//!   session that is always torn down
//! - Sites are queried concurrently under one deadline
//! - Graceful degradation: a failing site yields an error record, the
//!   others still return products
//!
//! ## Security
//!
//! - No API keys or secrets
//! - No persistence: nothing outlives a single search
//! - Search queries are logged only at trace level

pub mod adapter;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod orchestrator;
pub mod registry;
pub mod sites;
pub mod types;

pub use adapter::{FieldMap, FieldSelector, SiteAdapter};
pub use config::SearchConfig;
pub use error::{ExtractError, FetchError, Result, SearchError};
pub use fetch::{PageFetcher, SiteFetcher};
pub use registry::SiteRegistry;
pub use types::{
    FetchStrategy, FetchedPage, FieldValue, ProductDetails, ProductRecord, RecordOutcome,
    SiteSelection, UNAVAILABLE,
};

/// Search the selected sites for `query`.
///
/// Builds a fresh [`SiteFetcher`] for this search, queries every site
/// resolved from `selection` concurrently, and returns one record per site
/// in registry order. Per-site failures are reported inside the records.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid or the HTTP
/// client cannot be built, and [`SearchError::Validation`] if `query` is
/// blank.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> shopscan_search::Result<()> {
/// use shopscan_search::{SearchConfig, SiteRegistry, SiteSelection};
///
/// let registry = SiteRegistry::builtin();
/// let selection = SiteSelection::parse("amazon,flipkart");
/// let records =
///     shopscan_search::search("wireless mouse", &selection, &registry, &SearchConfig::default())
///         .await?;
/// for record in &records {
///     match record.details() {
///         Some(details) => println!("{}: {} at {}", record.site, details.title, details.offer_price),
///         None => println!("{}: {}", record.site, record.error().unwrap_or_default()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    selection: &SiteSelection,
    registry: &SiteRegistry,
    config: &SearchConfig,
) -> Result<Vec<ProductRecord>> {
    orchestrator::search::validate_query(query)?;
    let fetcher = SiteFetcher::new(config)?;
    orchestrator::search::orchestrate_search(query, selection, registry, &fetcher, config).await
}

/// Search every built-in site with default configuration.
///
/// Convenience wrapper around [`search`].
///
/// # Errors
///
/// Same as [`search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> shopscan_search::Result<()> {
/// let records = shopscan_search::search_default("usb hub").await?;
/// println!("{}", serde_json::to_string_pretty(&records).unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub async fn search_default(query: &str) -> Result<Vec<ProductRecord>> {
    search(
        query,
        &SiteSelection::All,
        &SiteRegistry::builtin(),
        &SearchConfig::default(),
    )
    .await
}
