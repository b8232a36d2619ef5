//! Server binary for shopscan.

use clap::Parser;
use shopscan::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// shopscan: compare the top product result across retail sites.
#[derive(Parser)]
#[command(name = "shopscan-server", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("shopscan=info,shopscan_search=info,chromiumoxide=warn")
        }))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shopscan starting");

    shopscan::run_server(config).await.map_err(|e| {
        tracing::error!(error = %e, "shopscan exited with error");
        e
    })?;

    tracing::info!("shopscan shut down cleanly");
    Ok(())
}
