//! TCP connect port probe.
//!
//! Attempts a TCP handshake against each port in the canonical list, all
//! concurrently. A completed handshake before the deadline means `open`;
//! refusal, timeout, or any other socket error uniformly means `closed` -
//! the probe does not distinguish filtered from closed from refused, and a
//! socket error is never surfaced as a probe failure.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures::future::join_all;
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use tokio::net::TcpStream;

use crate::config::{PORT_CONNECT_TIMEOUT_MS, PROBED_PORTS};
use crate::error_handling::ProbeError;
use crate::probes::dns::resolve_host;
use crate::target::ScanTarget;

/// Open/closed verdict for a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
}

/// The verdict for one probed port.
#[derive(Debug, Clone, Serialize)]
pub struct PortCheck {
    pub port: u16,
    pub status: PortStatus,
}

/// The full port sweep for one scan. `ports` always matches the canonical
/// probe list in length and order.
#[derive(Debug, Clone, Serialize)]
pub struct PortScan {
    pub ip: String,
    pub ports: Vec<PortCheck>,
}

/// Probes a single port with a connect timeout.
///
/// Dropping the timed-out connect future tears the pending socket down, so
/// no descriptor outlives the probe.
pub async fn check_port(ip: IpAddr, port: u16, timeout: Duration) -> PortCheck {
    let addr = SocketAddr::new(ip, port);
    let status = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            PortStatus::Open
        }
        // Timeout, refusal, or any socket error: closed
        _ => PortStatus::Closed,
    };
    PortCheck { port, status }
}

/// Resolves the target and sweeps the canonical port list concurrently.
///
/// `join_all` preserves input order, so the result sequence matches the
/// canonical list regardless of which sockets complete first.
///
/// # Errors
///
/// Returns [`ProbeError::DnsResolutionFailed`] if the target cannot be
/// resolved; individual port failures are verdicts, not errors.
pub async fn scan_ports(
    target: &ScanTarget,
    resolver: &TokioAsyncResolver,
) -> Result<PortScan, ProbeError> {
    let ip = resolve_host(target.host(), resolver).await?;
    let timeout = Duration::from_millis(PORT_CONNECT_TIMEOUT_MS);

    let checks = join_all(
        PROBED_PORTS
            .iter()
            .map(|&port| check_port(ip, port, timeout)),
    )
    .await;

    let open_count = checks
        .iter()
        .filter(|c| c.status == PortStatus::Open)
        .count();
    log::debug!("{}: {open_count}/{} probed ports open", target.host(), checks.len());

    Ok(PortScan {
        ip: ip.to_string(),
        ports: checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_open_port_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let check = check_port(LOCALHOST, port, Duration::from_millis(500)).await;
        assert_eq!(check.port, port);
        assert_eq!(check.status, PortStatus::Open);
    }

    #[tokio::test]
    async fn test_closed_port_detected() {
        // Bind and drop to find a port that is almost certainly closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let check = check_port(LOCALHOST, port, Duration::from_millis(500)).await;
        assert_eq!(check.status, PortStatus::Closed);
    }

    #[tokio::test]
    async fn test_sweep_preserves_canonical_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // A mixed list: an open local port sandwiched between closed ones
        let ports = [open_port.wrapping_add(1), open_port, open_port.wrapping_add(2)];
        let timeout = Duration::from_millis(500);
        let checks = join_all(
            ports
                .iter()
                .map(|&port| check_port(LOCALHOST, port, timeout)),
        )
        .await;

        assert_eq!(checks.len(), ports.len());
        for (check, expected) in checks.iter().zip(ports.iter()) {
            assert_eq!(check.port, *expected);
        }
        assert_eq!(checks[1].status, PortStatus::Open);
    }

    #[test]
    fn test_canonical_port_list() {
        assert_eq!(
            PROBED_PORTS,
            [21, 22, 23, 25, 53, 80, 110, 143, 443, 3306, 8080]
        );
    }

    #[test]
    fn test_port_status_serialization() {
        assert_eq!(serde_json::to_string(&PortStatus::Open).unwrap(), "\"open\"");
        assert_eq!(
            serde_json::to_string(&PortStatus::Closed).unwrap(),
            "\"closed\""
        );
    }
}
