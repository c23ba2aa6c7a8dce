//! Scan report data model and rendering
//!
//! The report is assembled once at the end of a scan and immutable after
//! that. The JSON shape is consumed directly by callers; the text rendering
//! is what the command-line front end prints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, time::Duration};

use crate::error::Result;

/// The three fingerprint signal outputs, already rendered as labeled text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsSignalReport {
    /// TTL-based classification or failure label
    pub ttl: String,
    /// Open-port signature hints or negative/inconclusive label
    pub port_signature: String,
    /// One line per well-known port that produced a banner outcome
    pub banners: Vec<String>,
}

/// Complete result of one scan invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// The target exactly as the caller supplied it
    pub target: String,
    /// Address all probes were sent to; resolved once, never re-resolved
    pub resolved_address: IpAddr,
    /// First port of the swept range
    pub range_start: u16,
    /// Last port of the swept range
    pub range_end: u16,
    /// Reachable ports, sorted ascending, no duplicates
    pub open_ports: Vec<u16>,
    /// Fingerprint signal outputs
    pub os_signals: OsSignalReport,
    /// Wall-clock duration of the whole scan
    pub duration: Duration,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable rendering
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Target: {}\n", self.target));
        out.push_str(&format!("IP Address: {}\n", self.resolved_address));

        out.push_str("OS Detection Results:\n");
        out.push_str(&format!("  TTL-based: {}\n", self.os_signals.ttl));
        out.push_str(&format!("  Port-based: {}\n", self.os_signals.port_signature));
        if self.os_signals.banners.is_empty() {
            out.push_str("  Service Info: No service banners captured\n");
        } else {
            out.push_str(&format!(
                "  Service Info: {}\n",
                self.os_signals.banners.join("; ")
            ));
        }

        if self.open_ports.is_empty() {
            out.push_str(&format!(
                "No open ports found in range {}-{}\n",
                self.range_start, self.range_end
            ));
        } else {
            let ports = self
                .open_ports
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("Open ports: {}\n", ports));
        }

        out.push_str(&format!(
            "Scan completed in {:.2}s\n",
            self.duration.as_secs_f64()
        ));

        out
    }
}
