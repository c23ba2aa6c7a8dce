//! Hostrecon - single-target network reconnaissance
//!
//! Main entry point. Initializes logging and configuration, then runs one
//! scan and prints the report.

use anyhow::Result;
use clap::Parser;
use hostrecon::{
    cli::{Cli, OutputFormat},
    config::ScanConfig,
    coordinator::ScanCoordinator,
    logging,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config_path {
        Some(path) => ScanConfig::load(path).await?,
        None => ScanConfig::default(),
    };
    cli.apply_overrides(&mut config)?;

    logging::init_logging_with_config(&config.logging)?;

    info!("Starting hostrecon scan of {}", cli.target);

    let coordinator = ScanCoordinator::new(config)?;
    let report = coordinator.scan(&cli.target).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
