//! Bounded-parallel port sweeping
//!
//! Fans one probe task out per port in the range, gated by a semaphore so the
//! number of in-flight probes never exceeds the configured ceiling regardless
//! of range size. An unbounded fan-out against the full 65535-port space
//! exhausts file descriptors and trips OS connection-rate limiting, so the
//! ceiling is part of the contract, not a tuning knob.
//!
//! Completion order is nondeterministic; the sorted fan-in keeps it out of
//! the result.

use std::{net::IpAddr, sync::Arc, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::{
    config::SweepConfig,
    error::{Result, ScannerError},
    probe::{PortProber, TcpProber},
};

/// Validated inclusive port interval `[start, end]`, `1 <= start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 {
            return Err(ScannerError::validation(
                "port_range",
                "port 0 is not scannable; the range starts at 1",
            ));
        }
        if start > end {
            return Err(ScannerError::validation(
                "port_range",
                format!("start port {} exceeds end port {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false // a validated range always holds at least one port
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl std::fmt::Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Concurrent sweep over a port range, collecting the reachable subset
pub struct PortSweeper {
    prober: Arc<dyn PortProber>,
    concurrency_limit: usize,
    probe_timeout: Duration,
}

impl PortSweeper {
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            prober: Arc::new(TcpProber),
            concurrency_limit: config.concurrency_limit,
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    /// Build a sweeper around a custom prober implementation
    pub fn with_prober(
        prober: Arc<dyn PortProber>,
        concurrency_limit: usize,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            concurrency_limit,
            probe_timeout,
        }
    }

    /// Sweep the range and return the open ports sorted ascending.
    ///
    /// Every probe owns its own timeout; a hanging probe delays only its own
    /// permit, never the collection of the others. An empty result is a valid
    /// outcome (closed or filtered host), not an error.
    pub async fn sweep(&self, address: IpAddr, range: &PortRange) -> Vec<u16> {
        debug!(
            "Sweeping {} ports on {} (ceiling {})",
            range.len(),
            address,
            self.concurrency_limit
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut handles = Vec::with_capacity(range.len());

        for port in range.ports() {
            let prober = self.prober.clone();
            let semaphore = semaphore.clone();
            let probe_timeout = self.probe_timeout;

            handles.push(tokio::spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.unwrap();
                if prober.probe(address, port, probe_timeout).await {
                    debug!("Port {}:{} is open", address, port);
                    Some(port)
                } else {
                    None
                }
            }));
        }

        let mut open_ports = Vec::new();
        for handle in handles {
            if let Ok(Some(port)) = handle.await {
                open_ports.push(port);
            }
        }

        open_ports.sort_unstable();
        open_ports.dedup();

        info!(
            "Sweep of {} complete: {} open of {} probed",
            address,
            open_ports.len(),
            range.len()
        );
        open_ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_range_validation() {
        assert!(PortRange::new(1, 1024).is_ok());
        assert!(PortRange::new(80, 80).is_ok());
        assert!(PortRange::new(0, 80).is_err());
        assert!(PortRange::new(9001, 8999).is_err());
    }

    #[test]
    fn test_range_len() {
        assert_eq!(PortRange::new(8999, 9001).unwrap().len(), 3);
        assert_eq!(PortRange::new(443, 443).unwrap().len(), 1);
    }

    /// Prober that reports a fixed port set as open, for deterministic sweeps.
    struct FixedProber {
        open: Vec<u16>,
    }

    #[async_trait]
    impl PortProber for FixedProber {
        async fn probe(&self, _address: IpAddr, port: u16, _timeout: Duration) -> bool {
            self.open.contains(&port)
        }
    }

    /// Prober that tracks the highwater mark of simultaneous callers.
    struct CountingProber {
        active: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait]
    impl PortProber for CountingProber {
        async fn probe(&self, _address: IpAddr, _port: u16, _timeout: Duration) -> bool {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            false
        }
    }

    #[tokio::test]
    async fn test_sweep_output_sorted_and_in_range() {
        let prober = Arc::new(FixedProber {
            open: vec![443, 22, 80, 8080],
        });
        let sweeper = PortSweeper::with_prober(prober, 64, Duration::from_millis(100));
        let range = PortRange::new(20, 1000).unwrap();

        let open = sweeper.sweep(LOCALHOST, &range).await;

        // 8080 is outside the range and must not appear.
        assert_eq!(open, vec![22, 80, 443]);
        assert!(open.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_sweep_all_closed_is_empty_not_error() {
        let prober = Arc::new(FixedProber { open: vec![] });
        let sweeper = PortSweeper::with_prober(prober, 64, Duration::from_millis(100));
        let range = PortRange::new(1, 50).unwrap();

        assert!(sweeper.sweep(LOCALHOST, &range).await.is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_probes_never_exceed_ceiling() {
        let prober = Arc::new(CountingProber {
            active: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let limit = 8;
        let sweeper = PortSweeper::with_prober(prober.clone(), limit, Duration::from_millis(100));
        let range = PortRange::new(1, 100).unwrap();

        sweeper.sweep(LOCALHOST, &range).await;

        assert!(prober.max_seen.load(Ordering::SeqCst) <= limit);
        assert_eq!(prober.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sweep_finds_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let sweeper = PortSweeper::with_prober(
            Arc::new(TcpProber),
            32,
            Duration::from_millis(500),
        );
        let range = PortRange::new(port - 1, port + 1).unwrap();

        let open = sweeper.sweep(LOCALHOST, &range).await;
        assert!(open.contains(&port));
    }
}
