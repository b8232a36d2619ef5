//! Application configuration: server binding, search tuning and site adapters.
//!
//! Loaded from a TOML file. Every table is optional and missing keys take
//! their defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [search]
//! request_delay_ms = [500, 1500]
//! max_browser_sessions = 1
//!
//! [[sites]]
//! name = "amazon"
//! # ...
//! ```

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use shopscan_search::{SearchConfig, SiteAdapter, SiteRegistry};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "SHOPSCAN_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Fetch, retry and timeout policy for searches.
    pub search: SearchConfig,
    /// Site adapters. When non-empty these replace the built-in sites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<SiteAdapter>,
}

/// Where the query endpoint listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for [`tokio::net::TcpListener::bind`].
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the configuration the server should run with.
    ///
    /// Uses the first of: `cli_path`, `$SHOPSCAN_CONFIG`, the default config
    /// path if that file exists. Without any of them the defaults apply.
    /// The result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be loaded, or if the
    /// search settings or site adapters are invalid.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(
            cli_path,
            std::env::var_os(CONFIG_ENV_VAR),
            Self::default_config_path(),
        );

        let config = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            None => {
                tracing::info!("no config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check search settings and site adapters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Search`] with the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.registry()?;
        Ok(())
    }

    /// Build the site registry: configured sites if any, else the built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Search`] if a configured adapter is invalid or
    /// two share a name.
    pub fn registry(&self) -> Result<SiteRegistry> {
        if self.sites.is_empty() {
            return Ok(SiteRegistry::builtin());
        }
        Ok(SiteRegistry::new(self.sites.clone())?)
    }

    /// Returns the default config file path: `~/.config/shopscan/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("shopscan").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("shopscan")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/shopscan-config/config.toml")
        }
    }
}

/// Pick the config file: explicit path, then env var, then the default
/// location only if it exists.
fn resolve_config_path(
    cli_path: Option<&Path>,
    env_path: Option<OsString>,
    default_path: PathBuf,
) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_path.exists().then_some(default_path)
}
