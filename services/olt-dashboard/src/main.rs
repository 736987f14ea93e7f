//! OLT Dashboard CLI
//!
//! Command-line interface for the OLT and ONU monitoring dashboard.

use std::path::PathBuf;

use clap::Parser;
use olt_dashboard::{load_config, Config, OltDashboardBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "olt-dashboard")]
#[command(about = "Live dashboard for OLT and ONU state")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// OLT management backend base URL (overrides config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, dashboard_port={:?}, backend_url={:?}, log_level={:?}",
        args.config,
        args.dashboard_port,
        args.backend_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }
    if let Some(backend_url) = args.backend_url {
        config.backend.base_url = backend_url;
    }

    tracing::info!("Starting OLT dashboard");
    tracing::debug!(
        "Views: {}, traffic feed: {:?}",
        config.views.len(),
        config.traffic.address
    );

    OltDashboardBuilder::new(config).build()?.start().await?;

    Ok(())
}
