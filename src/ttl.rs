//! TTL-based operating system fingerprinting
//!
//! Invokes the platform echo-request utility once, pulls the round-trip TTL
//! out of its textual output, and maps it onto a coarse OS bucket. The
//! substring parsing is deliberately isolated in [`parse_ttl`] so the
//! echo-utility dependency can be swapped for a raw ICMP implementation
//! without touching the bucket table.
//!
//! The bucket boundaries are heuristics, kept as data so they can be revised
//! independently of the plumbing.

use std::{fmt, net::IpAddr, ops::RangeInclusive, time::Duration};
use tokio::{process::Command, time::timeout};
use tracing::debug;

/// Ordered TTL classification table; first match wins, most specific first.
pub const TTL_BUCKETS: &[(RangeInclusive<u8>, &str)] = &[
    (255..=255, "Cisco/Network Equipment"),
    (129..=254, "Possibly Windows (High TTL)"),
    (65..=128, "Windows"),
    (32..=64, "Linux/Unix"),
    (1..=31, "Possibly Embedded/Limited Device"),
];

/// Map a TTL value onto its OS bucket.
pub fn classify_ttl(ttl: u8) -> &'static str {
    for (range, label) in TTL_BUCKETS {
        if range.contains(&ttl) {
            return label;
        }
    }
    "Unknown OS"
}

/// Why the TTL token could not be extracted from the echo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlParseError {
    /// Output carried no `ttl=` token at all
    NoToken,
    /// A `ttl=` token was present but its value was not an integer
    Unparsable,
}

/// Extract the round-trip TTL from echo-utility output.
///
/// Case-insensitive; accepts `ttl=64` and `TTL=128` style tokens anywhere in
/// the output.
pub fn parse_ttl(output: &str) -> Result<u8, TtlParseError> {
    let lowered = output.to_lowercase();

    let token_start = lowered.find("ttl=").ok_or(TtlParseError::NoToken)?;
    let value = lowered[token_start + 4..]
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("");

    value.parse::<u8>().map_err(|_| TtlParseError::Unparsable)
}

/// Outcome of the TTL signal; every failure mode is reported distinctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtlOutcome {
    Classified { ttl: u8, label: &'static str },
    PingTimeout,
    PingFailed,
    NoTtlFound,
    UnparsableTtl,
}

impl fmt::Display for TtlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classified { ttl, label } => write!(f, "{} (ttl={})", label, ttl),
            Self::PingTimeout => write!(f, "Ping timeout - Host may be slow or blocking ICMP"),
            Self::PingFailed => write!(f, "Ping failed - Host may be down or blocking ICMP"),
            Self::NoTtlFound => write!(f, "No TTL found in ping response"),
            Self::UnparsableTtl => write!(f, "Unreadable TTL in ping response"),
        }
    }
}

/// TTL fingerprint signal backed by the external `ping` utility
pub struct TtlFingerprinter {
    ping_timeout: Duration,
}

impl TtlFingerprinter {
    pub fn new(ping_timeout: Duration) -> Self {
        Self { ping_timeout }
    }

    /// Send one echo request and classify the answering stack by TTL.
    pub async fn fingerprint(&self, address: IpAddr) -> TtlOutcome {
        let output = match timeout(self.ping_timeout, self.ping_once(address)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("Echo utility failed to run for {}: {}", address, e);
                return TtlOutcome::PingFailed;
            }
            Err(_) => return TtlOutcome::PingTimeout,
        };

        if !output.status.success() {
            return TtlOutcome::PingFailed;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_ttl(&stdout) {
            Ok(ttl) => TtlOutcome::Classified {
                ttl,
                label: classify_ttl(ttl),
            },
            Err(TtlParseError::NoToken) => TtlOutcome::NoTtlFound,
            Err(TtlParseError::Unparsable) => TtlOutcome::UnparsableTtl,
        }
    }

    #[cfg(windows)]
    async fn ping_once(&self, address: IpAddr) -> std::io::Result<std::process::Output> {
        Command::new("ping")
            .args(["-n", "1", "-w", "1000"])
            .arg(address.to_string())
            .output()
            .await
    }

    #[cfg(not(windows))]
    async fn ping_once(&self, address: IpAddr) -> std::io::Result<std::process::Output> {
        Command::new("ping")
            .args(["-c", "1", "-W", "1"])
            .arg(address.to_string())
            .output()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert_eq!(classify_ttl(64), "Linux/Unix");
        assert_eq!(classify_ttl(32), "Linux/Unix");
        assert_eq!(classify_ttl(128), "Windows");
        assert_eq!(classify_ttl(65), "Windows");
        assert_eq!(classify_ttl(255), "Cisco/Network Equipment");
        assert_eq!(classify_ttl(200), "Possibly Windows (High TTL)");
        assert_eq!(classify_ttl(16), "Possibly Embedded/Limited Device");
    }

    #[test]
    fn test_parse_ttl_from_linux_ping_output() {
        let output = "64 bytes from 192.0.2.1: icmp_seq=1 ttl=64 time=0.045 ms";
        assert_eq!(parse_ttl(output), Ok(64));
    }

    #[test]
    fn test_parse_ttl_uppercase_token() {
        // Windows ping prints TTL in caps.
        let output = "Reply from 192.0.2.1: bytes=32 time<1ms TTL=128";
        assert_eq!(parse_ttl(output), Ok(128));
    }

    #[test]
    fn test_parse_ttl_no_token() {
        let output = "Request timed out.";
        assert_eq!(parse_ttl(output), Err(TtlParseError::NoToken));
    }

    #[test]
    fn test_parse_ttl_garbled_token() {
        let output = "64 bytes from host: ttl=abc time=1 ms";
        assert_eq!(parse_ttl(output), Err(TtlParseError::Unparsable));
    }

    #[test]
    fn test_outcome_labels_are_distinct() {
        let outcomes = [
            TtlOutcome::PingTimeout,
            TtlOutcome::PingFailed,
            TtlOutcome::NoTtlFound,
            TtlOutcome::UnparsableTtl,
        ];
        for (i, a) in outcomes.iter().enumerate() {
            for b in outcomes.iter().skip(i + 1) {
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }
}
