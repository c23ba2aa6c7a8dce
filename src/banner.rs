//! Service banner grabbing
//!
//! For a fixed table of well-known ports: connect, send one
//! protocol-appropriate probe (an HTTP HEAD line for web ports, a bare
//! newline otherwise), read a bounded response, and keep the first line as a
//! truncated excerpt. Failures are per-port: a refused connection or a silent
//! service downgrades that one entry and never aborts the remaining probes.

use futures::future::join_all;
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};
use tracing::debug;

use crate::config::FingerprintConfig;

/// Banner probe table; output order follows this table, never completion
/// order.
pub const BANNER_PORTS: &[(u16, &str)] = &[
    (22, "SSH"),
    (80, "HTTP"),
    (443, "HTTPS"),
    (23, "Telnet"),
    (21, "FTP"),
];

/// Table ports that speak HTTP and get a request instead of a newline nudge
const HTTP_PORTS: &[u16] = &[80, 443];

/// Marker appended to an excerpt cut at the display width
pub const TRUNCATION_MARKER: &str = "...";

/// Probe payload for a table port: web ports get a request, everything else
/// is nudged with a newline and expected to volunteer its greeting.
fn probe_payload(port: u16) -> &'static [u8] {
    if HTTP_PORTS.contains(&port) {
        b"HEAD / HTTP/1.0\r\n\r\n"
    } else {
        b"\n"
    }
}

/// Per-port outcome of one banner probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerOutcome {
    /// First response line, truncated to the display width
    Excerpt(String),
    /// Connection succeeded but the service sent nothing
    Empty,
    /// Probe write or response read failed or timed out
    ReadFailed,
    /// Connection attempt failed; nothing is listening or it was refused
    Unreachable,
}

/// One entry of the banner signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBanner {
    pub port: u16,
    pub label: &'static str,
    pub outcome: BannerOutcome,
}

impl ServiceBanner {
    /// Render the entry for the report; unreachable ports contribute nothing.
    pub fn summary(&self) -> Option<String> {
        match &self.outcome {
            BannerOutcome::Excerpt(excerpt) => {
                Some(format!("{}({}): {}", self.label, self.port, excerpt))
            }
            BannerOutcome::Empty => Some(format!("{}({}): No banner", self.label, self.port)),
            BannerOutcome::ReadFailed => {
                Some(format!("{}({}): Banner read failed", self.label, self.port))
            }
            BannerOutcome::Unreachable => None,
        }
    }
}

/// Collapse a banner run into report lines.
pub fn summaries(banners: &[ServiceBanner]) -> Vec<String> {
    banners.iter().filter_map(ServiceBanner::summary).collect()
}

/// Banner grabbing signal over the well-known table
pub struct BannerProber {
    connect_timeout: Duration,
    read_timeout: Duration,
    read_limit: usize,
    excerpt_width: usize,
}

impl BannerProber {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            connect_timeout: config.banner_connect_timeout(),
            read_timeout: config.banner_read_timeout(),
            read_limit: config.banner_read_limit,
            excerpt_width: config.banner_excerpt_width,
        }
    }

    /// Probe every table port concurrently; the result vector preserves table
    /// order.
    pub async fn probe_all(&self, address: IpAddr) -> Vec<ServiceBanner> {
        let probes = BANNER_PORTS.iter().map(|&(port, label)| async move {
            let outcome = self.probe_one(address, port).await;
            debug!("Banner probe {}:{} -> {:?}", address, port, outcome);
            ServiceBanner {
                port,
                label,
                outcome,
            }
        });

        join_all(probes).await
    }

    async fn probe_one(&self, address: IpAddr, port: u16) -> BannerOutcome {
        let addr = SocketAddr::new(address, port);

        let mut stream = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            _ => return BannerOutcome::Unreachable,
        };

        let payload = probe_payload(port);

        if timeout(self.read_timeout, stream.write_all(payload))
            .await
            .map_or(true, |r| r.is_err())
        {
            return BannerOutcome::ReadFailed;
        }

        let mut buffer = vec![0u8; self.read_limit];
        let bytes_read = match timeout(self.read_timeout, stream.read(&mut buffer)).await {
            Ok(Ok(n)) => n,
            _ => return BannerOutcome::ReadFailed,
        };

        if bytes_read == 0 {
            return BannerOutcome::Empty;
        }

        self.excerpt(&buffer[..bytes_read])
    }

    /// First line of the response, truncated to the display width.
    fn excerpt(&self, raw: &[u8]) -> BannerOutcome {
        let text = String::from_utf8_lossy(raw);
        let first_line = text.lines().next().unwrap_or("").trim();

        if first_line.is_empty() {
            return BannerOutcome::Empty;
        }

        let excerpt = if first_line.chars().count() > self.excerpt_width {
            let cut: String = first_line.chars().take(self.excerpt_width).collect();
            format!("{}{}", cut, TRUNCATION_MARKER)
        } else {
            first_line.to_string()
        };

        BannerOutcome::Excerpt(excerpt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn test_prober() -> BannerProber {
        BannerProber {
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(500),
            read_limit: 1024,
            excerpt_width: 50,
        }
    }

    #[test]
    fn test_payload_matches_table_protocols() {
        // Every HTTP-payload port must actually be in the probe table.
        for port in HTTP_PORTS {
            assert!(BANNER_PORTS.iter().any(|(p, _)| p == port));
        }
        for &(port, _) in BANNER_PORTS {
            let payload = probe_payload(port);
            if HTTP_PORTS.contains(&port) {
                assert!(payload.starts_with(b"HEAD / HTTP/1.0"));
            } else {
                assert_eq!(payload, b"\n");
            }
        }
    }

    #[test]
    fn test_excerpt_keeps_short_first_line() {
        let prober = test_prober();
        let outcome = prober.excerpt(b"SSH-2.0-OpenSSH_8.3p1\r\nsecond line");
        assert_eq!(
            outcome,
            BannerOutcome::Excerpt("SSH-2.0-OpenSSH_8.3p1".to_string())
        );
    }

    #[test]
    fn test_excerpt_truncates_with_marker() {
        let prober = test_prober();
        let long_line = "A".repeat(80);
        match prober.excerpt(long_line.as_bytes()) {
            BannerOutcome::Excerpt(excerpt) => {
                assert_eq!(excerpt.len(), 50 + TRUNCATION_MARKER.len());
                assert!(excerpt.ends_with(TRUNCATION_MARKER));
            }
            other => panic!("expected excerpt, got {:?}", other),
        }
    }

    #[test]
    fn test_excerpt_blank_response_is_empty() {
        let prober = test_prober();
        assert_eq!(prober.excerpt(b"   \r\n"), BannerOutcome::Empty);
    }

    #[test]
    fn test_summary_lines() {
        let banner = ServiceBanner {
            port: 22,
            label: "SSH",
            outcome: BannerOutcome::Excerpt("SSH-2.0-OpenSSH_8.3p1".to_string()),
        };
        assert_eq!(
            banner.summary().unwrap(),
            "SSH(22): SSH-2.0-OpenSSH_8.3p1"
        );

        let unreachable = ServiceBanner {
            port: 23,
            label: "Telnet",
            outcome: BannerOutcome::Unreachable,
        };
        assert_eq!(unreachable.summary(), None);
    }

    #[tokio::test]
    async fn test_probe_one_reads_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"220 ftp.example.com ready\r\n")
                .await
                .unwrap();
        });

        let prober = test_prober();
        let outcome = prober.probe_one(LOCALHOST, port).await;
        assert_eq!(
            outcome,
            BannerOutcome::Excerpt("220 ftp.example.com ready".to_string())
        );
    }

    #[tokio::test]
    async fn test_probe_one_unreachable_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = test_prober();
        assert_eq!(
            prober.probe_one(LOCALHOST, port).await,
            BannerOutcome::Unreachable
        );
    }

    #[tokio::test]
    async fn test_probe_one_silent_service_is_read_failed() {
        // Accepts but never writes; the read must time out, not hang.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let prober = test_prober();
        assert_eq!(
            prober.probe_one(LOCALHOST, port).await,
            BannerOutcome::ReadFailed
        );
    }
}
