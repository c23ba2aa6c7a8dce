//! Open-port signature fingerprinting
//!
//! Probes a fixed table of well-known service ports and applies an ordered,
//! additive rule list over the resulting open set. Rules are data, not nested
//! conditionals: each one is a named predicate over the open set paired with
//! the hint it contributes, so rules can be tested independently and extended
//! without touching the aggregation.

use futures::future::join_all;
use std::{collections::BTreeMap, net::IpAddr, sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    config::FingerprintConfig,
    probe::{PortProber, TcpProber},
};

/// Well-known service ports probed for the signature signal
pub const SERVICE_PORTS: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1433, "MSSQL (Windows)"),
    (1521, "Oracle DB"),
    (3306, "MySQL"),
    (3389, "RDP (Windows)"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (8080, "HTTP-Alt"),
];

const WEB_PORTS: &[u16] = &[80, 443, 8080];
const DB_PORTS: &[u16] = &[3306, 5432, 1433, 1521];

/// The open subset of [`SERVICE_PORTS`], keyed by port for stable iteration
pub type OpenServices = BTreeMap<u16, &'static str>;

/// One heuristic: a predicate over the open set and the hint it fires
pub struct SignatureRule {
    pub hint: &'static str,
    pub applies: fn(&OpenServices) -> bool,
}

fn rdp_present(open: &OpenServices) -> bool {
    open.contains_key(&3389)
}

fn mssql_present(open: &OpenServices) -> bool {
    open.contains_key(&1433)
}

fn ssh_without_rdp(open: &OpenServices) -> bool {
    open.contains_key(&22) && !open.contains_key(&3389)
}

fn postgres_present(open: &OpenServices) -> bool {
    open.contains_key(&5432)
}

fn telnet_only_login(open: &OpenServices) -> bool {
    open.contains_key(&23) && !open.contains_key(&22) && !open.contains_key(&3389)
}

fn dns_dominant(open: &OpenServices) -> bool {
    open.contains_key(&53) && open.len() <= 3
}

fn web_limited(open: &OpenServices) -> bool {
    WEB_PORTS.iter().any(|p| open.contains_key(p)) && open.len() <= 3
}

fn web_among_many(open: &OpenServices) -> bool {
    WEB_PORTS.iter().any(|p| open.contains_key(p)) && open.len() > 3
}

fn any_database(open: &OpenServices) -> bool {
    DB_PORTS.iter().any(|p| open.contains_key(p))
}

/// Ordered rule list; more than one hint may fire, and output order follows
/// this table.
pub const SIGNATURE_RULES: &[SignatureRule] = &[
    SignatureRule {
        hint: "Windows (RDP detected)",
        applies: rdp_present,
    },
    SignatureRule {
        hint: "Windows (MSSQL detected)",
        applies: mssql_present,
    },
    SignatureRule {
        hint: "Linux/Unix (SSH detected)",
        applies: ssh_without_rdp,
    },
    SignatureRule {
        hint: "Linux/Unix (PostgreSQL detected)",
        applies: postgres_present,
    },
    SignatureRule {
        hint: "Network Device (Telnet detected)",
        applies: telnet_only_login,
    },
    SignatureRule {
        hint: "Network Device (DNS server)",
        applies: dns_dominant,
    },
    SignatureRule {
        hint: "Web Server (Limited services)",
        applies: web_limited,
    },
    SignatureRule {
        hint: "Web Server (Multiple services)",
        applies: web_among_many,
    },
    SignatureRule {
        hint: "Database Server",
        applies: any_database,
    },
];

/// Apply the rule table to an open set and render the signal text.
pub fn classify_open_ports(open: &OpenServices) -> String {
    if open.is_empty() {
        return "No common ports open or host is filtering".to_string();
    }

    let hints: Vec<&str> = SIGNATURE_RULES
        .iter()
        .filter(|rule| (rule.applies)(open))
        .map(|rule| rule.hint)
        .collect();

    let labels = open
        .iter()
        .map(|(port, service)| format!("{}({})", port, service))
        .collect::<Vec<_>>()
        .join(", ");

    if hints.is_empty() {
        format!("Open ports: {} - OS detection inconclusive", labels)
    } else {
        format!("{} - Open ports: {}", hints.join(", "), labels)
    }
}

/// Signature fingerprint signal: probe the service table, classify the result
pub struct PortSignatureFingerprinter {
    prober: Arc<dyn PortProber>,
    probe_timeout: Duration,
}

impl PortSignatureFingerprinter {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            prober: Arc::new(TcpProber),
            probe_timeout: config.signature_probe_timeout(),
        }
    }

    pub fn with_prober(prober: Arc<dyn PortProber>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            probe_timeout,
        }
    }

    /// Probe all table ports concurrently and classify the open subset.
    pub async fn fingerprint(&self, address: IpAddr) -> String {
        let probes = SERVICE_PORTS.iter().map(|&(port, service)| {
            let prober = self.prober.clone();
            let probe_timeout = self.probe_timeout;
            async move {
                if prober.probe(address, port, probe_timeout).await {
                    Some((port, service))
                } else {
                    None
                }
            }
        });

        let open: OpenServices = join_all(probes).await.into_iter().flatten().collect();
        debug!("Signature probe of {}: {} well-known ports open", address, open.len());

        classify_open_ports(&open)
    }
}
