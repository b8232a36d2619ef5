//! Core types: product records, field values, fetch strategies and site selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel written for any field the extractor could not locate.
pub const UNAVAILABLE: &str = "unavailable";

/// A single display field: either extracted text or the unavailable marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldValue {
    /// Text found in the page, whitespace-normalised.
    Value(String),
    /// Nothing matched for this field.
    Unavailable,
}

impl FieldValue {
    /// Fold an optional extraction into a field, mapping `None` to the marker.
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Unavailable,
        }
    }

    /// Returns `true` if this field carries extracted text.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The text to display, which is the marker for a missing field.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Unavailable => UNAVAILABLE,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        if value == UNAVAILABLE {
            Self::Unavailable
        } else {
            Self::Value(value)
        }
    }
}

impl From<FieldValue> for String {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Value(v) => v,
            FieldValue::Unavailable => UNAVAILABLE.to_owned(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six display fields of a successfully extracted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(rename = "Title")]
    pub title: FieldValue,
    /// List price, usually the struck-through one.
    #[serde(rename = "Price")]
    pub price: FieldValue,
    /// Discounted / selling price.
    #[serde(rename = "Offer Price")]
    pub offer_price: FieldValue,
    #[serde(rename = "Rating")]
    pub rating: FieldValue,
    #[serde(rename = "Reviews Count")]
    pub review_count: FieldValue,
    /// Absolute URL of the product detail page.
    #[serde(rename = "Product Link")]
    pub product_link: FieldValue,
}

/// What a site contributed to a search: product data or a failure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordOutcome {
    Found(ProductDetails),
    Failed {
        #[serde(rename = "Error")]
        error: String,
    },
}

/// One result from one site. Every requested site yields exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Registered site name.
    #[serde(rename = "Website")]
    pub site: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl ProductRecord {
    /// Record for a site whose first product block was extracted.
    pub fn found(site: impl Into<String>, details: ProductDetails) -> Self {
        Self {
            site: site.into(),
            outcome: RecordOutcome::Found(details),
        }
    }

    /// Record for a site that failed; `error` is rendered with `Display`.
    pub fn failed(site: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            site: site.into(),
            outcome: RecordOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    /// Extracted details, if the site succeeded.
    pub fn details(&self) -> Option<&ProductDetails> {
        match &self.outcome {
            RecordOutcome::Found(details) => Some(details),
            RecordOutcome::Failed { .. } => None,
        }
    }

    /// Failure description, if the site failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Found(_) => None,
            RecordOutcome::Failed { error } => Some(error),
        }
    }
}

/// How a site's result page has to be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// A direct GET; the server-rendered HTML already contains the results.
    PlainHttp,
    /// Results are rendered client-side and need a headless browser.
    RenderedBrowser,
}

impl FetchStrategy {
    /// Returns the configuration name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlainHttp => "plain-http",
            Self::RenderedBrowser => "rendered-browser",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which registered sites a search should cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SiteSelection {
    /// Every registered site.
    #[default]
    All,
    /// An explicit subset, matched case-insensitively against site names.
    Named(Vec<String>),
}

impl SiteSelection {
    /// Parse a comma-separated site filter.
    ///
    /// Blank input, or any entry equal to `all`, selects every site.
    pub fn parse(filter: &str) -> Self {
        let names: Vec<String> = filter
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();

        if names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
            Self::All
        } else {
            Self::Named(names)
        }
    }
}

/// Raw page content retrieved for one site.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub url: String,
    /// Response body or rendered DOM.
    pub html: String,
}

/// Outcome of a single fetch.
pub type FetchResult = std::result::Result<FetchedPage, crate::error::FetchError>;
