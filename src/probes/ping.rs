//! Reachability probe.
//!
//! ICMP echo needs raw-socket privileges, so reachability is measured as a
//! timed TCP connect against 443 and then 80. The probe never fails: an
//! unresolvable or unreachable host is reported as `alive: false`, the
//! same way an echo with no reply would be.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use tokio::net::TcpStream;

use crate::config::{PING_TIMEOUT_MS, REACHABILITY_PORTS};
use crate::target::ScanTarget;

/// Outcome of a reachability probe.
#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub host: String,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u128>,
}

impl PingReport {
    fn unreachable(host: &str) -> Self {
        PingReport {
            host: host.to_string(),
            alive: false,
            address: None,
            latency_ms: None,
        }
    }
}

/// Probes whether the target answers on 443 or 80, with connect latency.
///
/// Always returns a report; resolution and connect failures map to
/// `alive: false` rather than a probe error.
pub async fn probe_reachability(
    target: &ScanTarget,
    resolver: &TokioAsyncResolver,
) -> PingReport {
    let host = target.host();
    let ip = match crate::probes::dns::resolve_host(host, resolver).await {
        Ok(ip) => ip,
        Err(e) => {
            log::debug!("reachability probe could not resolve {host}: {e}");
            return PingReport::unreachable(host);
        }
    };

    let timeout = Duration::from_millis(PING_TIMEOUT_MS);
    for port in REACHABILITY_PORTS {
        let addr = SocketAddr::new(ip, port);
        let started = Instant::now();
        if let Ok(Ok(stream)) = tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            drop(stream);
            return PingReport {
                host: host.to_string(),
                alive: true,
                address: Some(ip.to_string()),
                latency_ms: Some(started.elapsed().as_millis()),
            };
        }
    }

    PingReport {
        address: Some(ip.to_string()),
        ..PingReport::unreachable(host)
    }
}
