//! Single-port TCP connect probing
//!
//! The atomic unit of work for the whole engine: one connection attempt to
//! one (address, port) under a hard timeout. "Not provably open" is a single
//! outcome, so refused, timed out, and unreachable all collapse to `false`
//! and nothing here ever raises to the caller.

use async_trait::async_trait;
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tokio::{net::TcpStream, time::timeout};

/// Probe seam for everything that asks "is this port reachable?"
///
/// Implementations own their socket exclusively for the probe's lifetime and
/// must release it on every exit path.
#[async_trait]
pub trait PortProber: Send + Sync {
    async fn probe(&self, address: IpAddr, port: u16, probe_timeout: Duration) -> bool;
}

/// Default prober: a plain TCP connect attempt
#[derive(Debug, Default)]
pub struct TcpProber;

#[async_trait]
impl PortProber for TcpProber {
    async fn probe(&self, address: IpAddr, port: u16, probe_timeout: Duration) -> bool {
        let addr = SocketAddr::new(address, port);

        // The stream is dropped (and the socket closed) on every branch.
        matches!(
            timeout(probe_timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        )
    }
}
