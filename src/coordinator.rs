//! Scan orchestration
//!
//! One coordinator drives one scan: resolve the target, then run the port
//! sweep and the fingerprint aggregation concurrently against the pinned
//! address, and assemble the immutable report. Resolution failure
//! short-circuits before any probing; fingerprint signal failures arrive as
//! labeled data inside the report, never as scan failure.

use chrono::Utc;
use std::time::Instant;
use tracing::info;

use crate::{
    config::ScanConfig,
    error::Result,
    os_detection::FingerprintAggregator,
    report::ScanReport,
    resolve::resolve_target,
    sweep::{PortRange, PortSweeper},
};

/// Entry point for one-shot target scans
pub struct ScanCoordinator {
    config: ScanConfig,
}

impl ScanCoordinator {
    /// Build a coordinator; the configuration is validated here, before any
    /// I/O can happen.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run a full scan against one target.
    pub async fn scan(&self, target: &str) -> Result<ScanReport> {
        let started = Instant::now();

        let range = PortRange::new(self.config.sweep.start_port, self.config.sweep.end_port)?;
        let address = resolve_target(target).await?;

        info!("Scanning {} ({}) over ports {}", target, address, range);

        let sweeper = PortSweeper::new(&self.config.sweep);
        let aggregator =
            FingerprintAggregator::new(&self.config.fingerprint, self.config.signal_timeout());

        // Independent reads of the same resolved address; run them together.
        let (open_ports, os_signals) = tokio::join!(
            sweeper.sweep(address, &range),
            aggregator.fingerprint(address),
        );

        let duration = started.elapsed();
        info!(
            "Scan of {} finished in {:.2}s with {} open ports",
            target,
            duration.as_secs_f64(),
            open_ports.len()
        );

        Ok(ScanReport {
            target: target.to_string(),
            resolved_address: address,
            range_start: range.start(),
            range_end: range.end(),
            open_ports,
            os_signals,
            duration,
            completed_at: Utc::now(),
        })
    }
}
