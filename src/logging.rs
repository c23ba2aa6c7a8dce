//! Logging and observability setup
//!
//! Structured console logging via `tracing` with pretty and JSON formats.

use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::{config::LoggingConfig, error::ScannerError};

/// Initialize logging with specific configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(&config.level)?;

    let registry = Registry::default().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let console_layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_target(true);

            registry.with(console_layer).init();
        }
        _ => {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(false);

            registry.with(console_layer).init();
        }
    }

    Ok(())
}

/// Create environment filter from log level string
fn create_env_filter(level: &str) -> Result<EnvFilter> {
    let base_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => return Err(ScannerError::config(format!("Invalid log level: {}", level)).into()),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(base_level.into())
        .from_env()
        .context("Failed to create environment filter")?;

    Ok(filter)
}
