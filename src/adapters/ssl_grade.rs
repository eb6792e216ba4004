//! TLS-grading adapter (SSL Labs analyze API).
//!
//! One GET per scan; the upstream body is normalized into a typed
//! assessment so the scoring layer can read the first endpoint's grade
//! without touching raw JSON. The endpoint sequence may be empty while an
//! assessment is still in progress upstream.

use serde::Serialize;
use serde_json::Value;

use crate::adapters::send_for_json;
use crate::error_handling::ProbeError;
use crate::target::ScanTarget;

const SSL_ANALYZE_ENDPOINT: &str = "https://api.ssllabs.com/api/v3/analyze";

/// One graded endpoint from the upstream assessment.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Certificate validity window start, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_not_before: Option<i64>,
    /// Certificate validity window end, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_not_after: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alt_names: Vec<String>,
}

/// The normalized TLS assessment for a host.
#[derive(Debug, Clone, Serialize)]
pub struct SslAssessment {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub endpoints: Vec<SslEndpoint>,
}

impl SslAssessment {
    /// The first endpoint's letter grade, if any. Scoring reads only this.
    pub fn first_grade(&self) -> Option<&str> {
        self.endpoints.first().and_then(|e| e.grade.as_deref())
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Normalizes an upstream analyze body into the typed assessment.
///
/// Every field is optional upstream (assessments report partial data while
/// `status` is not yet `READY`), so missing fields degrade to `None`/empty
/// rather than failing the probe.
pub fn normalize_assessment(host: &str, body: &Value) -> SslAssessment {
    let endpoints = body
        .get("endpoints")
        .and_then(Value::as_array)
        .map(|endpoints| {
            endpoints
                .iter()
                .map(|endpoint| {
                    let cert = endpoint.pointer("/details/cert");
                    SslEndpoint {
                        grade: string_field(endpoint, "grade"),
                        ip_address: string_field(endpoint, "ipAddress"),
                        server_name: string_field(endpoint, "serverName"),
                        cert_not_before: cert
                            .and_then(|c| c.get("notBefore"))
                            .and_then(Value::as_i64),
                        cert_not_after: cert
                            .and_then(|c| c.get("notAfter"))
                            .and_then(Value::as_i64),
                        common_names: cert.map(|c| string_list(c, "commonNames")).unwrap_or_default(),
                        alt_names: cert.map(|c| string_list(c, "altNames")).unwrap_or_default(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    SslAssessment {
        host: string_field(body, "host").unwrap_or_else(|| host.to_string()),
        port: body.get("port").and_then(Value::as_u64).map(|p| p as u16),
        protocol: string_field(body, "protocol"),
        status: string_field(body, "status"),
        endpoints,
    }
}

/// Fetches and normalizes the TLS assessment for the target.
///
/// # Errors
///
/// Returns [`ProbeError::UpstreamFetchFailed`] on any transport failure or
/// non-2xx answer.
pub async fn fetch_ssl_assessment(
    target: &ScanTarget,
    client: &reqwest::Client,
) -> Result<SslAssessment, ProbeError> {
    let body = send_for_json(
        client
            .get(SSL_ANALYZE_ENDPOINT)
            .query(&[("host", target.host())]),
    )
    .await?;
    Ok(normalize_assessment(target.host(), &body))
}
