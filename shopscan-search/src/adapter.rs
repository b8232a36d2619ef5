//! Declarative per-site configuration.
//!
//! A [`SiteAdapter`] binds a site name to its search URL, fetch strategy and
//! a [`FieldMap`] of CSS selectors. Retail markup changes often; keeping the
//! selectors here as data means a markup change is a config edit, and the
//! extractor never needs site-specific code.

use crate::error::SearchError;
use crate::types::FetchStrategy;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder in [`SiteAdapter::query_url_template`] replaced by the encoded term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Where to find one field inside a product block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    /// CSS selector evaluated inside the product block; the first match wins.
    pub selector: String,
    /// Optional second selector evaluated inside the first match, for values
    /// nested in a wrapper element (e.g. the amount inside a price box).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<String>,
    /// Read this attribute instead of the element text. A matched element
    /// without the attribute is a structural failure, not a missing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FieldSelector {
    /// Select the text of the first element matching `selector`.
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_owned(),
            nested: None,
            attr: None,
        }
    }

    /// Select the `href` of the first element matching `selector`.
    pub fn href(selector: &str) -> Self {
        Self {
            attr: Some("href".to_owned()),
            ..Self::text(selector)
        }
    }

    /// Look up the value in an element nested inside the primary match.
    pub fn with_nested(mut self, nested: &str) -> Self {
        self.nested = Some(nested.to_owned());
        self
    }

    fn selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.selector.as_str()).chain(self.nested.as_deref())
    }
}

/// Selectors for the six display fields. A field without a selector is
/// always reported as unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub title: Option<FieldSelector>,
    pub price: Option<FieldSelector>,
    pub offer_price: Option<FieldSelector>,
    pub rating: Option<FieldSelector>,
    pub review_count: Option<FieldSelector>,
    pub product_link: Option<FieldSelector>,
}

impl FieldMap {
    /// All configured fields with their names, in display order.
    pub fn entries(&self) -> [(&'static str, Option<&FieldSelector>); 6] {
        [
            ("title", self.title.as_ref()),
            ("price", self.price.as_ref()),
            ("offer_price", self.offer_price.as_ref()),
            ("rating", self.rating.as_ref()),
            ("review_count", self.review_count.as_ref()),
            ("product_link", self.product_link.as_ref()),
        ]
    }
}

/// Static configuration for one e-commerce site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAdapter {
    /// Registered name, reported as `Website` in records.
    pub name: String,
    /// Origin used to absolutise relative product links.
    pub base_url: String,
    /// Search URL containing [`QUERY_PLACEHOLDER`].
    pub query_url_template: String,
    pub fetch_strategy: FetchStrategy,
    /// Matches candidate product blocks on the results page.
    pub result_container_selector: String,
    /// Element whose presence means client-side results have rendered.
    /// Defaults to the result container selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_selector: Option<String>,
    #[serde(default)]
    pub fields: FieldMap,
}

impl SiteAdapter {
    /// Render the search URL for `term`, form-encoding it (spaces become `+`).
    pub fn query_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        self.query_url_template
            .replace(QUERY_PLACEHOLDER, &encoded)
    }

    /// Selector the browser waits for before capturing the page.
    pub fn ready_marker(&self) -> &str {
        self.ready_selector
            .as_deref()
            .unwrap_or(&self.result_container_selector)
    }

    /// Checks that the adapter can be used at all: a name, a parseable base
    /// URL, a template with the placeholder, and selectors that compile.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Config("site name must not be empty".into()));
        }

        let base = Url::parse(&self.base_url).map_err(|e| {
            SearchError::Config(format!("{}: invalid base_url {:?}: {e}", self.name, self.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "{}: base_url must be http or https",
                self.name
            )));
        }

        if !self.query_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(SearchError::Config(format!(
                "{}: query_url_template must contain {QUERY_PLACEHOLDER}",
                self.name
            )));
        }

        let mut selectors = vec![
            ("result_container_selector", self.result_container_selector.as_str()),
            ("ready_selector", self.ready_marker()),
        ];
        for (field, selector) in self.fields.entries() {
            if let Some(selector) = selector {
                selectors.extend(selector.selectors().map(|s| (field, s)));
            }
        }

        for (what, css) in selectors {
            Selector::parse(css).map_err(|e| {
                SearchError::Config(format!("{}: invalid {what} selector {css:?}: {e:?}", self.name))
            })?;
        }

        Ok(())
    }
}
