//! DNS resolution probes.
//!
//! Two independent operations: a forward lookup (domain to a single IP),
//! which seeds the port probe and the geolocation adapter, and an
//! ANY-style record enumeration. Both surface resolver failures as
//! `DNS_RESOLUTION_FAILED` immediately; there are no retries beyond the
//! resolver's own attempt count.

use std::net::IpAddr;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;

use crate::error_handling::ProbeError;
use crate::target::ScanTarget;

/// Record types queried in place of a literal ANY query, which most
/// resolvers refuse to answer (RFC 8482).
const ENUMERATED_RECORD_TYPES: [RecordType; 7] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::TXT,
    RecordType::SOA,
];

/// A single DNS record from an enumeration query.
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// The complete record set for an enumeration query. Records are unordered
/// with respect to each other.
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecords {
    pub records: Vec<DnsRecord>,
}

/// Resolves a target to a single IP address (the resolver's first answer).
///
/// # Errors
///
/// Returns [`ProbeError::DnsResolutionFailed`] if the resolver errors or
/// returns no addresses.
pub async fn resolve_host(
    host: &str,
    resolver: &TokioAsyncResolver,
) -> Result<IpAddr, ProbeError> {
    let response = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| ProbeError::DnsResolutionFailed(e.to_string()))?;
    response
        .iter()
        .next()
        .ok_or_else(|| ProbeError::DnsResolutionFailed(format!("no addresses found for {host}")))
}

/// Enumerates the record set a legacy ANY query would surface.
///
/// All record-type queries run concurrently; individual NXDOMAIN/NoRecords
/// answers are expected and skipped. The probe fails only when the merged
/// set is empty.
pub async fn resolve_records(
    target: &ScanTarget,
    resolver: &TokioAsyncResolver,
) -> Result<DnsRecords, ProbeError> {
    let host = target.host();
    let lookups = join_all(
        ENUMERATED_RECORD_TYPES
            .iter()
            .map(|&record_type| resolver.lookup(host, record_type)),
    )
    .await;

    let mut records = Vec::new();
    let mut last_error = None;
    for lookup in lookups {
        match lookup {
            Ok(answer) => {
                for record in answer.record_iter() {
                    let Some(data) = record.data() else { continue };
                    records.push(DnsRecord {
                        record_type: record.record_type().to_string(),
                        value: data.to_string(),
                        ttl: Some(record.ttl()),
                    });
                }
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    if records.is_empty() {
        let detail = last_error.unwrap_or_else(|| format!("no records found for {host}"));
        return Err(ProbeError::DnsResolutionFailed(detail));
    }

    log::debug!("resolved {} records for {host}", records.len());
    Ok(DnsRecords { records })
}
