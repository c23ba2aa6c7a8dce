//! Target name resolution
//!
//! One forward lookup per scan. The resolved address is pinned for the whole
//! scan so every probe talks to the same host even if DNS answers change
//! mid-flight. Resolution failure is terminal; there is nothing to probe.

use std::net::IpAddr;
use tracing::debug;

use crate::error::{Result, ScannerError};

/// Resolve a target (literal IP or domain name) to the address all probes
/// will use.
pub async fn resolve_target(target: &str) -> Result<IpAddr> {
    if target.is_empty() {
        return Err(ScannerError::validation("target", "target must not be empty"));
    }

    // Literal addresses skip the lookup entirely.
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    let mut addrs = tokio::net::lookup_host((target, 0u16))
        .await
        .map_err(|e| ScannerError::resolution(target, e.to_string()))?;

    match addrs.next() {
        Some(addr) => {
            debug!("Resolved {} -> {}", target, addr.ip());
            Ok(addr.ip())
        }
        None => Err(ScannerError::resolution(target, "lookup returned no addresses")),
    }
}
