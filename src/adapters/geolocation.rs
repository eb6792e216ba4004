//! Geolocation adapter (ip-api.com).
//!
//! Resolves the target to an IP itself (independently of the port probe's
//! lookup, so the two fail independently) and asks the geolocation service
//! about that IP.

use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::send_for_json;
use crate::error_handling::ProbeError;
use crate::probes::dns::resolve_host;
use crate::target::ScanTarget;

const GEOLOCATION_ENDPOINT: &str = "http://ip-api.com/json";

/// The resolved IP and the upstream geolocation payload, passed through
/// as-is.
#[derive(Debug, Clone, Serialize)]
pub struct IpInfo {
    pub ip: String,
    pub location: Value,
}

/// Looks up where the target's IP is hosted.
///
/// # Errors
///
/// Returns [`ProbeError::DnsResolutionFailed`] if the target cannot be
/// resolved, or [`ProbeError::UpstreamFetchFailed`] if the geolocation
/// service does.
pub async fn lookup_ip_info(
    target: &ScanTarget,
    client: &reqwest::Client,
    resolver: &TokioAsyncResolver,
) -> Result<IpInfo, ProbeError> {
    let ip = resolve_host(target.host(), resolver).await?;
    let location = send_for_json(client.get(format!("{GEOLOCATION_ENDPOINT}/{ip}"))).await?;
    Ok(IpInfo {
        ip: ip.to_string(),
        location,
    })
}
