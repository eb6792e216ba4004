//! External-service adapters.
//!
//! Typed clients wrapping the third-party HTTP APIs a scan consults:
//! geolocation, TLS grading, malware reputation, and page speed. Each
//! adapter performs exactly one GET per scan and normalizes every upstream
//! failure - transport error, timeout, or non-2xx - into a uniform
//! `UPSTREAM_FETCH_FAILED`. Upstream error payloads are not parsed or
//! distinguished, and nothing is cached or retried.

pub mod geolocation;
pub mod malware;
pub mod pagespeed;
pub mod ssl_grade;

use serde_json::Value;

use crate::error_handling::{sanitize_error_message, ProbeError};

/// Sends a prepared upstream request and decodes the 2xx JSON body.
///
/// Shared by all adapters so their failure shapes stay identical.
pub(crate) async fn send_for_json(request: reqwest::RequestBuilder) -> Result<Value, ProbeError> {
    let response = request.send().await.map_err(upstream_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::UpstreamFetchFailed(format!(
            "upstream returned HTTP {status}"
        )));
    }

    response.json::<Value>().await.map_err(upstream_error)
}

/// Folds a transport-level reqwest failure into the uniform upstream error,
/// keeping a short human-readable cause.
fn upstream_error(error: reqwest::Error) -> ProbeError {
    let cause = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else if error.is_decode() {
        format!("response body was not valid JSON: {error}")
    } else {
        error.to_string()
    };
    ProbeError::UpstreamFetchFailed(sanitize_error_message(&cause))
}
