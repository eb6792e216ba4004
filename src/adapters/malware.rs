//! Malware-reputation adapter (VirusTotal domains API).
//!
//! Requires an API key, supplied via configuration. The adapter derives a
//! summary verdict from the upstream malicious-vendor count and attaches
//! the raw per-vendor verdict set in both cases.

use serde::Serialize;
use serde_json::Value;

use crate::adapters::send_for_json;
use crate::error_handling::ProbeError;
use crate::target::ScanTarget;

const VIRUSTOTAL_DOMAIN_ENDPOINT: &str = "https://www.virustotal.com/api/v3/domains";

pub const VERDICT_MALWARE: &str = "Malware Detected";
pub const VERDICT_CLEAN: &str = "No Malware Detected";

/// Summary verdict plus the raw per-vendor analysis results.
#[derive(Debug, Clone, Serialize)]
pub struct MalwareReport {
    pub status: String,
    pub malicious: u64,
    pub details: Value,
}

/// Derives the report from an upstream domain-analysis body.
///
/// `"Malware Detected"` when the malicious-vendor count is positive, else
/// `"No Malware Detected"`; the per-vendor results ride along either way.
pub fn derive_verdict(body: &Value) -> MalwareReport {
    let malicious = body
        .pointer("/data/attributes/last_analysis_stats/malicious")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let details = body
        .pointer("/data/attributes/last_analysis_results")
        .cloned()
        .unwrap_or(Value::Null);

    let status = if malicious > 0 {
        VERDICT_MALWARE
    } else {
        VERDICT_CLEAN
    };

    MalwareReport {
        status: status.to_string(),
        malicious,
        details,
    }
}

/// Fetches the domain's reputation and derives the verdict.
///
/// # Errors
///
/// Returns [`ProbeError::UpstreamFetchFailed`] when no API key is
/// configured, or on any transport failure or non-2xx answer.
pub async fn fetch_malware_report(
    target: &ScanTarget,
    client: &reqwest::Client,
    api_key: Option<&str>,
) -> Result<MalwareReport, ProbeError> {
    let api_key = api_key.ok_or_else(|| {
        ProbeError::UpstreamFetchFailed("no VirusTotal API key configured".to_string())
    })?;

    let body = send_for_json(
        client
            .get(format!("{VIRUSTOTAL_DOMAIN_ENDPOINT}/{}", target.host()))
            .header("x-apikey", api_key),
    )
    .await?;

    Ok(derive_verdict(&body))
}
