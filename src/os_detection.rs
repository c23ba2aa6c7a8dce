//! Multi-signal operating system detection
//!
//! Runs the three fingerprint signals (echo TTL, open-port signature, service
//! banners) concurrently, each under its own timeout, and merges their
//! labeled outputs. A signal that overruns its budget contributes an explicit
//! "timed out" entry; the aggregate is always produced, even when every
//! signal fails.

use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

use crate::{
    banner::{self, BannerProber},
    config::FingerprintConfig,
    report::OsSignalReport,
    signature::PortSignatureFingerprinter,
    ttl::TtlFingerprinter,
};

/// Label a signal contributes when it exceeds its budget
pub const SIGNAL_TIMED_OUT: &str = "Signal timed out";

/// Fan-out/fan-in over the three fingerprint signals
pub struct FingerprintAggregator {
    ttl: TtlFingerprinter,
    signature: PortSignatureFingerprinter,
    banner: BannerProber,
    signal_timeout: Duration,
}

impl FingerprintAggregator {
    pub fn new(config: &FingerprintConfig, signal_timeout: Duration) -> Self {
        Self {
            ttl: TtlFingerprinter::new(config.ping_timeout()),
            signature: PortSignatureFingerprinter::new(config),
            banner: BannerProber::new(config),
            signal_timeout,
        }
    }

    /// Run all signals against the resolved address. Infallible: failures
    /// inside a signal arrive already rendered as that signal's outcome text,
    /// and an overrun is downgraded to [`SIGNAL_TIMED_OUT`] here.
    pub async fn fingerprint(&self, address: IpAddr) -> OsSignalReport {
        info!("Fingerprinting {} across 3 signals", address);

        let (ttl, port_signature, banners) = tokio::join!(
            timeout(self.signal_timeout, self.ttl.fingerprint(address)),
            timeout(self.signal_timeout, self.signature.fingerprint(address)),
            timeout(self.signal_timeout, self.banner.probe_all(address)),
        );

        OsSignalReport {
            ttl: ttl
                .map(|outcome| outcome.to_string())
                .unwrap_or_else(|_| SIGNAL_TIMED_OUT.to_string()),
            port_signature: port_signature.unwrap_or_else(|_| SIGNAL_TIMED_OUT.to_string()),
            banners: banners
                .map(|results| banner::summaries(&results))
                .unwrap_or_else(|_| vec![SIGNAL_TIMED_OUT.to_string()]),
        }
    }
}
