//! # Hostrecon - Single-Target Network Reconnaissance
//!
//! A one-shot reconnaissance tool: resolve a target, sweep a TCP port range
//! under bounded concurrency, and derive a best-effort operating-system
//! fingerprint from three independent signals.
//!
//! ## Features
//!
//! - **Port Sweeping**: TCP connect probes fanned out across a range with a
//!   configurable in-flight ceiling and per-probe timeouts
//! - **Banner Grabbing**: protocol-appropriate probes against well-known
//!   service ports with bounded reads
//! - **OS Fingerprinting**: ICMP echo TTL, open-port signatures, and service
//!   banners aggregated into one report; any subset of signals may fail
//!   without failing the scan
//! - **Structured Output**: human-readable text or JSON
//!
//! ## Architecture
//!
//! Each scan builds everything it needs, runs to completion, and discards it:
//! there is no state carried across scans. The only process-wide data are the
//! read-only well-known-port tables and classification rules.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod report;
pub mod resolve;

// Probing and fingerprinting
pub mod banner;
pub mod os_detection;
pub mod probe;
pub mod signature;
pub mod sweep;
pub mod ttl;

// Re-exports for convenience
pub use crate::{
    config::ScanConfig,
    coordinator::ScanCoordinator,
    error::{Result, ScannerError},
    report::ScanReport,
};
