//! Configuration management system
//!
//! Provides centralized configuration management with support for:
//! - TOML configuration files
//! - Environment variables
//! - Command-line overrides
//!
//! Every value is fixed at startup and read-only for the lifetime of the
//! process; a scan never mutates its configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Port sweep configuration
    pub sweep: SweepConfig,
    /// Fingerprint signal configuration
    pub fingerprint: FingerprintConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First port of the inclusive sweep range
    pub start_port: u16,
    /// Last port of the inclusive sweep range
    pub end_port: u16,
    /// Maximum number of simultaneously in-flight probes
    pub concurrency_limit: usize,
    /// Timeout for each connection attempt in milliseconds
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Budget for each fingerprint signal in milliseconds
    pub signal_timeout_ms: u64,
    /// Per-port connect timeout for the signature probe in milliseconds
    pub signature_probe_timeout_ms: u64,
    /// Connect timeout for banner grabbing in milliseconds
    pub banner_connect_timeout_ms: u64,
    /// Read timeout for banner grabbing in milliseconds
    pub banner_read_timeout_ms: u64,
    /// Maximum bytes read from a banner response
    pub banner_read_limit: usize,
    /// Display width a banner excerpt is truncated to
    pub banner_excerpt_width: usize,
    /// Timeout for the external echo-request utility in seconds
    pub ping_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sweep: SweepConfig {
                start_port: 1,
                end_port: 1024,
                concurrency_limit: 512,
                probe_timeout_ms: 1000,
            },
            fingerprint: FingerprintConfig {
                signal_timeout_ms: 10_000,
                signature_probe_timeout_ms: 500,
                banner_connect_timeout_ms: 2000,
                banner_read_timeout_ms: 3000,
                banner_read_limit: 1024,
                banner_excerpt_width: 50,
                ping_timeout_secs: 5,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from file with environment variable overrides
    pub async fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        debug!("Loading configuration from: {}", config_path.display());

        let mut settings = config::Config::builder();

        // Start with default configuration
        settings = settings.add_source(config::Config::try_from(&Self::default())?);

        // Load from config file if it exists
        if config_path.exists() {
            debug!("Found configuration file, loading settings");
            settings = settings.add_source(config::File::from(config_path));
        } else {
            debug!("No configuration file found, using defaults");
        }

        // Override with environment variables (prefixed with RECON_)
        settings = settings.add_source(
            config::Environment::with_prefix("RECON")
                .separator("_")
                .try_parsing(true),
        );

        let config: ScanConfig = settings
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Write the default configuration to a file
    pub async fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let config_content = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")?;

        tokio::fs::write(path, config_content)
            .await
            .context("Failed to write default configuration file")?;

        info!("Created default configuration file: {}", path.display());
        Ok(())
    }

    /// Validate configuration values; rejected before any I/O begins
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ScannerError;

        if self.sweep.start_port == 0 {
            return Err(ScannerError::validation(
                "sweep.start_port",
                "port 0 is not scannable; the range starts at 1",
            ));
        }

        if self.sweep.start_port > self.sweep.end_port {
            return Err(ScannerError::validation(
                "sweep.port_range",
                format!(
                    "start port {} exceeds end port {}",
                    self.sweep.start_port, self.sweep.end_port
                ),
            ));
        }

        if self.sweep.concurrency_limit == 0 {
            return Err(ScannerError::validation(
                "sweep.concurrency_limit",
                "concurrency limit must be greater than 0",
            ));
        }

        if self.sweep.probe_timeout_ms == 0 {
            return Err(ScannerError::validation(
                "sweep.probe_timeout_ms",
                "probe timeout must be greater than 0",
            ));
        }

        let fingerprint_timeouts = [
            ("fingerprint.signal_timeout_ms", self.fingerprint.signal_timeout_ms),
            (
                "fingerprint.signature_probe_timeout_ms",
                self.fingerprint.signature_probe_timeout_ms,
            ),
            (
                "fingerprint.banner_connect_timeout_ms",
                self.fingerprint.banner_connect_timeout_ms,
            ),
            (
                "fingerprint.banner_read_timeout_ms",
                self.fingerprint.banner_read_timeout_ms,
            ),
            ("fingerprint.ping_timeout_secs", self.fingerprint.ping_timeout_secs),
        ];
        for (field, value) in fingerprint_timeouts {
            if value == 0 {
                return Err(ScannerError::validation(
                    field,
                    "fingerprint timeouts must be greater than 0",
                ));
            }
        }

        if self.fingerprint.banner_read_limit == 0 {
            return Err(ScannerError::validation(
                "fingerprint.banner_read_limit",
                "banner read limit must be greater than 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ScannerError::validation(
                    "logging.level",
                    format!("Invalid logging level: {}", other),
                ));
            }
        }

        Ok(())
    }

    /// Get per-probe timeout as Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.sweep.probe_timeout_ms)
    }

    /// Get per-signal budget as Duration
    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.fingerprint.signal_timeout_ms)
    }
}

impl FingerprintConfig {
    pub fn signature_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.signature_probe_timeout_ms)
    }

    pub fn banner_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_connect_timeout_ms)
    }

    pub fn banner_read_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_read_timeout_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = ScanConfig::default();
        config.sweep.start_port = 9001;
        config.sweep.end_port = 8999;
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut config = ScanConfig::default();
        config.sweep.start_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = ScanConfig::default();
        config.sweep.concurrency_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_probe_timeout_rejected() {
        let mut config = ScanConfig::default();
        config.sweep.probe_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_fingerprint_timeouts_rejected() {
        let cases: [fn(&mut ScanConfig); 5] = [
            |c| c.fingerprint.signal_timeout_ms = 0,
            |c| c.fingerprint.signature_probe_timeout_ms = 0,
            |c| c.fingerprint.banner_connect_timeout_ms = 0,
            |c| c.fingerprint.banner_read_timeout_ms = 0,
            |c| c.fingerprint.ping_timeout_secs = 0,
        ];
        for zero_out in cases {
            let mut config = ScanConfig::default();
            zero_out(&mut config);
            let err = config.validate().unwrap_err();
            assert!(err.is_config_error());
        }
    }

    #[tokio::test]
    async fn test_write_default_then_load_roundtrip() {
        let path = std::env::temp_dir().join("hostrecon-default-config.toml");
        ScanConfig::write_default(&path).await.unwrap();
        let loaded = ScanConfig::load(&path).await.unwrap();
        assert_eq!(loaded.sweep.end_port, ScanConfig::default().sweep.end_port);
        assert_eq!(loaded.logging.level, "info");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = ScanConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
