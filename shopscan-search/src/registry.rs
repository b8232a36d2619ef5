//! Site adapter registry: which sites exist and in what order.
//!
//! The registry is configuration. It is built once at startup, validated,
//! and only read afterwards. Resolution order is configuration order, and
//! the aggregator returns records in that order.

use crate::adapter::SiteAdapter;
use crate::error::SearchError;
use crate::sites;
use crate::types::SiteSelection;
use std::collections::HashSet;

/// Ordered, validated set of site adapters.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    adapters: Vec<SiteAdapter>,
}

impl SiteRegistry {
    /// Build a registry from adapters in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the list is empty, two adapters
    /// share a name (compared case-insensitively), or any adapter fails
    /// [`SiteAdapter::validate`].
    pub fn new(adapters: Vec<SiteAdapter>) -> Result<Self, SearchError> {
        if adapters.is_empty() {
            return Err(SearchError::Config(
                "at least one site must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for adapter in &adapters {
            adapter.validate()?;
            if !seen.insert(adapter.name.to_ascii_lowercase()) {
                return Err(SearchError::Config(format!(
                    "duplicate site name: {}",
                    adapter.name
                )));
            }
        }

        Ok(Self { adapters })
    }

    /// The built-in sites: Amazon, Flipkart, Snapdeal and Croma.
    pub fn builtin() -> Self {
        Self {
            adapters: vec![
                sites::amazon::adapter(),
                sites::flipkart::adapter(),
                sites::snapdeal::adapter(),
                sites::croma::adapter(),
            ],
        }
    }

    /// All adapters in configuration order.
    pub fn adapters(&self) -> &[SiteAdapter] {
        &self.adapters
    }

    /// Look up an adapter by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&SiteAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a site selection to adapters, in configuration order.
    ///
    /// Unknown names are skipped with a warning rather than failing the
    /// request; duplicate names resolve once.
    pub fn resolve(&self, selection: &SiteSelection) -> Vec<&SiteAdapter> {
        let SiteSelection::Named(names) = selection else {
            return self.adapters.iter().collect();
        };

        for name in names {
            if self.get(name).is_none() {
                tracing::warn!(site = name.as_str(), "unknown site requested, skipping");
            }
        }

        self.adapters
            .iter()
            .filter(|a| names.iter().any(|n| a.name.eq_ignore_ascii_case(n)))
            .collect()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
