//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls timeouts, retry policy, request pacing and
//! browser session limits. The defaults are tuned for polite scraping of
//! retail search pages.

use crate::error::SearchError;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a product search.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Deserializes from the `[search]`
/// table of the application config; missing keys take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-attempt HTTP request timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Total plain-http attempts per site, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles for each further attempt.
    pub backoff_base_ms: u64,
    /// Random delay range in milliseconds `(min, max)` before each site request.
    /// Spreads requests over time to avoid rate limiting.
    pub request_delay_ms: (u64, u64),
    /// How long a browser session waits for the results-loaded marker.
    pub browser_wait_seconds: u64,
    /// Deadline for the whole search. Sites still pending contribute a
    /// `timed out` record.
    pub search_timeout_seconds: u64,
    /// Maximum number of concurrent headless browser sessions per search.
    pub max_browser_sessions: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Chromium binary to launch. If `None`, `CHROMIUM_PATH` and the usual
    /// install locations are searched.
    pub chrome_executable: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            max_attempts: 5,
            backoff_base_ms: 1_000,
            request_delay_ms: (2_000, 5_000),
            browser_wait_seconds: 30,
            search_timeout_seconds: 60,
            max_browser_sessions: 2,
            user_agent: None,
            chrome_executable: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `request_timeout_seconds`, `browser_wait_seconds` and
    ///   `search_timeout_seconds` must be greater than 0
    /// - `max_attempts` must be greater than 0
    /// - `max_browser_sessions` must be greater than 0
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    /// - `user_agent`, if set, must be a non-blank valid header value
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.browser_wait_seconds == 0 {
            return Err(SearchError::Config(
                "browser_wait_seconds must be greater than 0".into(),
            ));
        }
        if self.search_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "search_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SearchError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.max_browser_sessions == 0 {
            return Err(SearchError::Config(
                "max_browser_sessions must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        if let Some(ua) = self.user_agent.as_deref() {
            if ua.trim().is_empty() || HeaderValue::from_str(ua).is_err() {
                return Err(SearchError::Config(format!(
                    "user_agent {ua:?} is not a valid header value"
                )));
            }
        }
        Ok(())
    }
}
