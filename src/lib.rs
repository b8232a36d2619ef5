//! shopscan: product search across Indian e-commerce sites.
//!
//! This crate is the application shell around `shopscan-search`:
//! Query endpoint → Registry → Fetcher → Extractor → Aggregator
//!
//! # Architecture
//!
//! - **Config**: TOML file with server, search and site adapter tables
//! - **Server**: `axum` router exposing the search form and JSON endpoint
//! - **Search core**: the `shopscan-search` crate, which fetches each site
//!   concurrently and extracts the first product on its results page

pub mod config;
pub mod error;
pub mod server;

pub use config::{AppConfig, ServerConfig};
pub use error::{AppError, Result};
pub use server::{router, run_server};
