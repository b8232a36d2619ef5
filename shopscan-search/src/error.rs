//! Error types for the shopscan-search crate.
//!
//! Only [`SearchError`] ever escapes a search. [`FetchError`] and
//! [`ExtractError`] are per-site outcomes: the aggregator folds them into
//! the `error` field of the corresponding [`crate::ProductRecord`], so their
//! `Display` strings are what callers see in the `Error` key.

/// Request- or configuration-level errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query term was empty or otherwise unusable. No fetch was attempted.
    #[error("invalid query: {0}")]
    Validation(String),

    /// Invalid search configuration or site adapter definition.
    #[error("config error: {0}")]
    Config(String),
}

/// Why a page could not be retrieved for one site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request, the browser wait, or the overall search deadline expired.
    #[error("timed out")]
    Timeout,

    /// The site answered with a non-success status.
    #[error("HTTP error: status {status}")]
    Http {
        /// Numeric HTTP status code.
        status: u16,
    },

    /// Connection, TLS, redirect or body-read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The headless browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),
}

/// Why a fetched page could not be turned into a product record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The result container selector matched nothing.
    #[error("no products found")]
    NoProducts,

    /// The markup matched but was not shaped as the adapter expects.
    #[error("structural failure: {0}")]
    Structural(String),
}

/// Convenience type alias for shopscan-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation() {
        let err = SearchError::Validation("search term must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid query: search term must not be empty"
        );
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_attempts must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: max_attempts must be greater than 0"
        );
    }

    #[test]
    fn display_fetch_errors() {
        assert_eq!(FetchError::Timeout.to_string(), "timed out");
        assert_eq!(
            FetchError::Http { status: 404 }.to_string(),
            "HTTP error: status 404"
        );
        assert_eq!(
            FetchError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            FetchError::Browser("no executable".into()).to_string(),
            "browser error: no executable"
        );
    }

    #[test]
    fn display_extract_errors() {
        assert_eq!(ExtractError::NoProducts.to_string(), "no products found");
        assert_eq!(
            ExtractError::Structural("link has no href".into()).to_string(),
            "structural failure: link has no href"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
        assert_send_sync::<FetchError>();
        assert_send_sync::<ExtractError>();
    }
}
