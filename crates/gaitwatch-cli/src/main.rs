//! Gaitwatch CLI Entry Point
//!
//! This is the main entry point for the gaitwatch command-line tool.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gaitwatch_cli::{gait, Cli};
use gaitwatch_core::MonitorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MonitorConfig::from_json(path)?,
        None => MonitorConfig::default(),
    };

    gait::execute(cli.command, &config).await
}
