//! Shared HTTP client and browser-like request identity.
//!
//! Provides a configured [`reqwest::Client`] with cookie support and
//! decompression, plus the per-request identity headers: a User-Agent
//! rotated from a fixed pool and `Accept*` headers that match what a real
//! browser sends alongside it.

use crate::config::SearchConfig;
use crate::error::FetchError;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per request.
pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-IN,en-US;q=0.9,en;q=0.8";
// Only codings the client can decode.
const ACCEPT_ENCODING_VALUE: &str = "gzip, br";

/// Build a [`reqwest::Client`] configured for retail search pages.
///
/// The client has:
/// - Cookie store enabled (consent and locale cookies survive redirects)
/// - Per-request timeout from config
/// - Brotli and gzip decompression
///
/// The User-Agent is not fixed on the client; see [`identity_headers`].
///
/// # Errors
///
/// Returns [`FetchError::Network`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Headers presenting one browser identity for a single request.
///
/// Uses the configured User-Agent when set, otherwise a fresh random one.
pub fn identity_headers(config: &SearchConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let ua = config
        .user_agent
        .as_deref()
        .and_then(|custom| HeaderValue::from_str(custom).ok())
        .unwrap_or_else(|| HeaderValue::from_static(random_user_agent()));
    headers.insert(USER_AGENT, ua);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING_VALUE));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        let config = SearchConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn identity_headers_use_pool_by_default() {
        let headers = identity_headers(&SearchConfig::default());
        let ua = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .expect("user agent header");
        assert!(USER_AGENTS.contains(&ua));
        assert_eq!(
            headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
            Some(ACCEPT_LANGUAGE_VALUE)
        );
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_ENCODING));
    }

    #[test]
    fn identity_headers_respect_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        let headers = identity_headers(&config);
        assert_eq!(
            headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
            Some("CustomBot/1.0")
        );
    }

    #[test]
    fn user_agents_list_not_empty() {
        assert!(!USER_AGENTS.is_empty());
        assert_eq!(USER_AGENTS.len(), 5);
    }
}
