//! Core search orchestrator: concurrent per-site fan-out, fetch, extract.
//!
//! Resolves the requested sites against the registry, runs the
//! fetch → extract pipeline for each one concurrently under a shared
//! deadline, and returns exactly one record per resolved site in
//! registry order.

use std::time::Duration;

use crate::adapter::SiteAdapter;
use crate::config::SearchConfig;
use crate::error::{FetchError, SearchError};
use crate::extract::extract;
use crate::fetch::PageFetcher;
use crate::registry::SiteRegistry;
use crate::types::{ProductRecord, SiteSelection};

/// Orchestrate a concurrent search across the selected sites.
///
/// # Pipeline
///
/// 1. Reject an empty (or whitespace-only) query before any fetch
/// 2. Resolve `selection` to adapters in registry order
/// 3. Fan out one fetch → extract pipeline per site with
///    [`futures::future::join_all`]
/// 4. Sites still pending at the `search_timeout_seconds` deadline yield a
///    `timed out` record
///
/// Per-site fetch and extraction failures become records with an error and
/// never affect other sites.
///
/// # Errors
///
/// Returns [`SearchError::Validation`] if the query is blank.
pub async fn orchestrate_search<F: PageFetcher>(
    query: &str,
    selection: &SiteSelection,
    registry: &SiteRegistry,
    fetcher: &F,
    config: &SearchConfig,
) -> Result<Vec<ProductRecord>, SearchError> {
    let query = validate_query(query)?;
    let adapters = registry.resolve(selection);
    tracing::trace!(query, sites = adapters.len(), "starting product search");

    let deadline =
        tokio::time::Instant::now() + Duration::from_secs(config.search_timeout_seconds);

    // 1. Fan out to all sites concurrently; join_all keeps input order.
    let futures: Vec<_> = adapters
        .into_iter()
        .map(|adapter| async move {
            match tokio::time::timeout_at(deadline, search_site(fetcher, adapter, query)).await {
                Ok(record) => record,
                Err(_) => {
                    tracing::warn!(site = adapter.name.as_str(), "search deadline reached");
                    ProductRecord::failed(&adapter.name, FetchError::Timeout)
                }
            }
        })
        .collect();

    let records = futures::future::join_all(futures).await;

    let failed = records.iter().filter(|r| r.error().is_some()).count();
    tracing::debug!(sites = records.len(), failed, "product search finished");

    Ok(records)
}

/// Trim the query and reject it if nothing is left.
pub fn validate_query(query: &str) -> Result<&str, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::Validation(
            "search term must not be empty".into(),
        ));
    }
    Ok(query)
}

/// Fetch and extract one site. Never fails: errors land in the record.
async fn search_site<F: PageFetcher>(
    fetcher: &F,
    adapter: &SiteAdapter,
    query: &str,
) -> ProductRecord {
    match fetcher.fetch(adapter, query).await {
        Ok(page) => {
            tracing::debug!(
                site = adapter.name.as_str(),
                url = page.url.as_str(),
                bytes = page.html.len(),
                "page fetched"
            );
            extract(&adapter.name, &page.html, adapter)
        }
        Err(err) => {
            tracing::warn!(site = adapter.name.as_str(), error = %err, "site fetch failed");
            ProductRecord::failed(&adapter.name, err)
        }
    }
}
