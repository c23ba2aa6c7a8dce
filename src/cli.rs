//! Command-line interface definition
//!
//! Argument parsing for single-target scans: target specification, port
//! range, concurrency, timeouts, and output format.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::ScanConfig;
use crate::error::{Result, ScannerError};

#[derive(Parser, Debug)]
#[command(
    name = "hostrecon",
    about = "Single-target TCP port sweep with OS fingerprint signals",
    version
)]
pub struct Cli {
    /// Target to scan (hostname or IP address)
    #[arg(required = true, help = "Target specification (e.g., 192.168.1.1, example.com)")]
    pub target: String,

    /// Port specification as a single port or an inclusive range
    #[arg(short = 'p', long, help = "Port to scan or inclusive range (e.g., 443 or 1-1024)", value_name = "PORTS")]
    pub ports: Option<String>,

    /// Maximum number of simultaneous connect probes
    #[arg(long, help = "Maximum number of in-flight probes", value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Per-port connect timeout during the sweep
    #[arg(long, help = "Per-port connect timeout in milliseconds", value_name = "MS")]
    pub probe_timeout_ms: Option<u64>,

    /// Output format
    #[arg(short = 'f', long, help = "Output format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Configuration file path
    #[arg(short = 'c', long, help = "Configuration file path", value_name = "FILE")]
    pub config_path: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON report
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// Fold command-line options into the loaded configuration. Flags the
    /// user did not pass leave the configured values untouched.
    pub fn apply_overrides(&self, config: &mut ScanConfig) -> Result<()> {
        if let Some(spec) = &self.ports {
            let (start, end) = parse_port_spec(spec)?;
            config.sweep.start_port = start;
            config.sweep.end_port = end;
        }

        if let Some(concurrency) = self.concurrency {
            config.sweep.concurrency_limit = concurrency;
        }

        if let Some(timeout_ms) = self.probe_timeout_ms {
            config.sweep.probe_timeout_ms = timeout_ms;
        }

        Ok(())
    }
}

/// Parse a port specification: either a single port ("443") or an inclusive
/// range ("1-1024"). Bound checks beyond syntax are left to config
/// validation.
pub fn parse_port_spec(spec: &str) -> Result<(u16, u16)> {
    let spec = spec.trim();

    if let Some((start, end)) = spec.split_once('-') {
        let start: u16 = start.trim().parse().map_err(|_| {
            ScannerError::validation("ports", format!("Invalid port number: {}", start))
        })?;
        let end: u16 = end.trim().parse().map_err(|_| {
            ScannerError::validation("ports", format!("Invalid port number: {}", end))
        })?;
        Ok((start, end))
    } else {
        let port: u16 = spec.parse().map_err(|_| {
            ScannerError::validation("ports", format!("Invalid port number: {}", spec))
        })?;
        Ok((port, port))
    }
}
