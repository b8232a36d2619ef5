//! Rendered-browser fetch strategy.
//!
//! Each fetch launches its own headless Chromium with a throwaway profile,
//! navigates to the search URL, waits for the site's results-loaded marker
//! and captures the DOM. Sessions are capped per fetcher by a semaphore.
//!
//! # Session lifecycle
//!
//! [`BrowserSession::close`] is called on every normal exit path, including
//! navigation failures and marker timeouts. If the surrounding future is
//! dropped instead (the search deadline expired), `Drop` spawns the same
//! shutdown on the current runtime. Without a runtime the [`Browser`] is
//! dropped in place, which kills the Chromium process. The profile
//! directory is owned by a guard created before launch, so it is removed
//! on every path, including a failed or cancelled launch.
//!
//! CDP requests share the marker wait budget: a navigation that outlasts
//! `browser_wait_seconds` is a [`FetchError::Timeout`].

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::PageFetcher;
use crate::adapter::SiteAdapter;
use crate::config::SearchConfig;
use crate::error::{FetchError, SearchError};
use crate::http;
use crate::types::{FetchResult, FetchedPage};

/// Longest pause between two marker polls.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Name prefix of every session profile directory.
const PROFILE_PREFIX: &str = "shopscan-chrome-";

/// Fetches client-rendered result pages through headless Chromium.
#[derive(Debug)]
pub struct BrowserFetcher {
    config: SearchConfig,
    sessions: Semaphore,
    profile_root: PathBuf,
}

impl BrowserFetcher {
    /// Create a fetcher allowing `config.max_browser_sessions` concurrent sessions.
    ///
    /// Session profiles are created under the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails [`SearchConfig::validate`].
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            sessions: Semaphore::new(config.max_browser_sessions),
            profile_root: std::env::temp_dir(),
        })
    }

    /// Create session profiles under `root` instead of the temp directory.
    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = root.into();
        self
    }

    /// Render `url` and return the DOM once `marker` is present.
    ///
    /// Waiting longer than `browser_wait_seconds` for the marker is a
    /// [`FetchError::Timeout`].
    pub async fn render(&self, url: &str, marker: &str) -> FetchResult {
        let _permit = self
            .sessions
            .acquire()
            .await
            .map_err(|e| FetchError::Browser(format!("session limiter closed: {e}")))?;

        let session = BrowserSession::launch(&self.config, &self.profile_root).await?;
        let wait = Duration::from_secs(self.config.browser_wait_seconds);
        let outcome = session.capture(url, marker, wait).await;
        session.close().await;
        outcome
    }
}

impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, adapter: &SiteAdapter, query: &str) -> FetchResult {
        self.render(&adapter.query_url(query), adapter.ready_marker())
            .await
    }
}

/// Throwaway Chromium profile directory, removed on drop.
struct ProfileDir(PathBuf);

impl ProfileDir {
    fn new(root: &Path) -> Self {
        Self(root.join(format!(
            "{PROFILE_PREFIX}{}-{:016x}",
            std::process::id(),
            rand::random::<u64>()
        )))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        remove_profile_dir(&self.0);
    }
}

/// A running Chromium process, its CDP event pump and its profile.
///
/// Fields drop in order: the process is killed before the profile goes.
struct RunningBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    profile: ProfileDir,
}

impl RunningBrowser {
    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        tracing::debug!(profile = %self.profile.path().display(), "browser session closed");
    }
}

/// One isolated browser session.
///
/// [`close`](Self::close) shuts the browser down in place. Dropping an
/// unclosed session hands the same shutdown to a background task.
struct BrowserSession {
    running: Option<RunningBrowser>,
}

impl BrowserSession {
    async fn launch(config: &SearchConfig, profile_root: &Path) -> Result<Self, FetchError> {
        let profile = ProfileDir::new(profile_root);
        let browser_config = session_config(config, profile.path())?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Unrecognised CDP messages surface here and are harmless.
                    tracing::trace!(error = %e, "browser handler event error");
                }
            }
        });

        tracing::debug!(profile = %profile.path().display(), "browser session started");
        Ok(Self {
            running: Some(RunningBrowser {
                browser,
                handler,
                profile,
            }),
        })
    }

    async fn capture(&self, url: &str, marker: &str, wait: Duration) -> FetchResult {
        let Some(running) = &self.running else {
            return Err(FetchError::Browser("browser session already closed".into()));
        };

        let page = running
            .browser
            .new_page(url)
            .await
            .map_err(navigation_error)?;

        wait_for_element(&page, marker, wait).await?;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("failed to read rendered page: {e}")))?;

        tracing::trace!(url, bytes = html.len(), "rendered page captured");
        Ok(FetchedPage {
            url: url.to_owned(),
            html,
        })
    }

    async fn close(mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown().await;
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        tracing::debug!("browser session dropped before close, tearing down");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(running.shutdown());
            }
            Err(_) => running.handler.abort(),
        }
    }
}

/// A CDP request that outlives the session's request timeout is a timeout;
/// anything else failed to load the page.
fn navigation_error(err: CdpError) -> FetchError {
    match err {
        CdpError::Timeout => FetchError::Timeout,
        other => FetchError::Network(format!("navigation failed: {other}")),
    }
}

/// Launch options for one session: headless, no sandbox, no GPU.
fn session_config(config: &SearchConfig, profile_dir: &Path) -> Result<BrowserConfig, FetchError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| http::random_user_agent().to_owned());

    let mut builder = BrowserConfig::builder()
        .headless_mode(HeadlessMode::default())
        .no_sandbox()
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-first-run")
        .arg("--mute-audio")
        .arg(format!("--user-agent={user_agent}"))
        .request_timeout(Duration::from_secs(
            config.request_timeout_seconds.min(config.browser_wait_seconds),
        ))
        .window_size(1366, 900)
        .user_data_dir(profile_dir);

    if let Some(path) = chrome_executable(config) {
        builder = builder.chrome_executable(path);
    }

    builder
        .build()
        .map_err(|e| FetchError::Browser(format!("invalid browser config: {e}")))
}

/// Configured executable, then `CHROMIUM_PATH`. `None` lets chromiumoxide
/// search the usual install locations.
fn chrome_executable(config: &SearchConfig) -> Option<PathBuf> {
    config.chrome_executable.clone().or_else(|| {
        std::env::var_os("CHROMIUM_PATH")
            .map(PathBuf::from)
            .filter(|p| p.exists())
    })
}

/// Poll for `selector` with exponential back-off until it appears or
/// `timeout` elapses.
async fn wait_for_element(page: &Page, selector: &str, timeout: Duration) -> Result<(), FetchError> {
    let start = Instant::now();
    let mut poll_interval = Duration::from_millis(100);

    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(());
        }

        if start.elapsed() >= timeout {
            tracing::debug!(
                selector,
                waited_ms = timeout.as_millis() as u64,
                "results marker never appeared"
            );
            return Err(FetchError::Timeout);
        }

        tokio::time::sleep(poll_interval).await;
        poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
    }
}

fn remove_profile_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove browser profile");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NO_RESULTS_HTML: &str = "<html><body><p>Loading results</p></body></html>";

    fn profiles_under(root: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(root)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with(PROFILE_PREFIX))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Chromium may still be exiting when teardown starts; give it a few seconds.
    async fn wait_for_no_profiles(root: &Path) -> Vec<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let left = profiles_under(root);
            if left.is_empty() || Instant::now() >= deadline {
                return left;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn serve_page_without_results() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(NO_RESULTS_HTML, "text/html"))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn session_config_with_explicit_executable() {
        let config = SearchConfig {
            chrome_executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..Default::default()
        };
        let profile = std::env::temp_dir().join("shopscan-chrome-config-test");
        assert!(session_config(&config, &profile).is_ok());
    }

    #[test]
    fn configured_executable_wins() {
        let config = SearchConfig {
            chrome_executable: Some(PathBuf::from("/opt/chrome/chrome")),
            ..Default::default()
        };
        assert_eq!(
            chrome_executable(&config),
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }

    #[test]
    fn fetcher_caps_sessions() {
        let config = SearchConfig {
            max_browser_sessions: 3,
            ..Default::default()
        };
        let fetcher = BrowserFetcher::new(&config).expect("valid config");
        assert_eq!(fetcher.sessions.available_permits(), 3);
    }

    #[test]
    fn zero_sessions_rejected() {
        let config = SearchConfig {
            max_browser_sessions: 0,
            ..Default::default()
        };
        let err = BrowserFetcher::new(&config).unwrap_err();
        assert!(err.to_string().contains("max_browser_sessions"), "{err}");
    }

    #[test]
    fn cdp_timeout_is_fetch_timeout() {
        assert_eq!(navigation_error(CdpError::Timeout), FetchError::Timeout);
        assert!(matches!(
            navigation_error(CdpError::ChromeMessage("net::ERR_NAME_NOT_RESOLVED".into())),
            FetchError::Network(msg) if msg.starts_with("navigation failed")
        ));
    }

    #[test]
    fn profile_dir_removed_on_drop() {
        let root = tempfile::tempdir().expect("tempdir");
        let profile = ProfileDir::new(root.path());
        assert!(profile
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PROFILE_PREFIX)));

        std::fs::create_dir_all(profile.path().join("Default")).expect("mkdir");
        std::fs::write(profile.path().join("Default/Preferences"), "{}").expect("write");
        assert_eq!(profiles_under(root.path()).len(), 1);

        drop(profile);
        assert!(profiles_under(root.path()).is_empty());
    }

    #[test]
    fn remove_profile_dir_ignores_missing() {
        remove_profile_dir(&std::env::temp_dir().join("shopscan-chrome-does-not-exist"));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BrowserFetcher>();
    }

    // ── Live Chromium ─────────────────────────────────────────────────
    // Run with `cargo test -- --ignored`; needs Chromium installed or `CHROMIUM_PATH`.

    #[tokio::test(flavor = "multi_thread")]
    #[ignore]
    async fn live_missing_marker_times_out_and_tears_down() {
        let server = serve_page_without_results().await;
        let root = tempfile::tempdir().expect("tempdir");
        let config = SearchConfig {
            browser_wait_seconds: 1,
            max_browser_sessions: 2,
            ..Default::default()
        };
        let fetcher = BrowserFetcher::new(&config)
            .expect("valid config")
            .with_profile_root(root.path());

        let result = fetcher
            .render(&format!("{}/search?q=mouse", server.uri()), "div.product-item")
            .await;

        assert!(matches!(result, Err(FetchError::Timeout)), "{result:?}");
        assert_eq!(fetcher.sessions.available_permits(), 2);
        assert_eq!(wait_for_no_profiles(root.path()).await, Vec::<PathBuf>::new());
    }

    #[tokio::test(flavor = "multi_thread")]
    #[ignore]
    async fn live_cancelled_render_tears_down() {
        let server = serve_page_without_results().await;
        let root = tempfile::tempdir().expect("tempdir");
        let config = SearchConfig {
            browser_wait_seconds: 60,
            max_browser_sessions: 1,
            ..Default::default()
        };
        let fetcher = BrowserFetcher::new(&config)
            .expect("valid config")
            .with_profile_root(root.path());

        let cancelled = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher.render(&format!("{}/search?q=mouse", server.uri()), "div.product-item"),
        )
        .await;

        assert!(cancelled.is_err(), "render should still be waiting for the marker");
        assert_eq!(fetcher.sessions.available_permits(), 1);
        assert_eq!(wait_for_no_profiles(root.path()).await, Vec::<PathBuf>::new());
    }

    #[tokio::test]
    #[ignore]
    async fn live_croma_render() {
        let config = SearchConfig::default();
        let fetcher = BrowserFetcher::new(&config).expect("valid config");
        let page = fetcher
            .fetch(&sites::croma::adapter(), "wireless mouse")
            .await
            .expect("live render should work");
        assert!(page.html.contains("product-item"));
        assert_eq!(fetcher.sessions.available_permits(), 2);
    }
}
