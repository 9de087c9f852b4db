//! Backpack grid trading bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Backpack grid trading bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BPGRID_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    bpgrid_bot::logging::init_logging();

    info!("Starting bpgrid-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > BPGRID_CONFIG env var > default.
    let config_path = args
        .config
        .or_else(|| std::env::var("BPGRID_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = bpgrid_bot::BotConfig::from_file(&config_path)?;
    info!(symbol = %config.symbol, grid_count = config.grid_count, "Configuration loaded");

    let app = bpgrid_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
