//! Security-header probe.
//!
//! One HTTPS GET against the target (following up to 5 redirects via the
//! dedicated client), reading exactly the seven fixed header names. A
//! missing header maps to null rather than an absent key; scoring relies
//! on that distinction. Any connection failure yields a single
//! `FETCH_FAILED` for the whole probe - never partial results.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::config::SECURITY_HEADERS;
use crate::error_handling::{sanitize_error_message, ProbeError};
use crate::target::ScanTarget;

/// The fixed seven-header report. Always contains all seven keys; a `None`
/// value means the header was absent from the response, not that the check
/// failed.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityHeaders {
    pub headers: BTreeMap<String, Option<String>>,
}

impl SecurityHeaders {
    /// Builds a report from explicit pairs, filling the remaining fixed
    /// keys with `None`.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<String>)>,
    {
        let mut headers: BTreeMap<String, Option<String>> = SECURITY_HEADERS
            .iter()
            .map(|name| (name.to_string(), None))
            .collect();
        for (name, value) in pairs {
            headers.insert(name.to_string(), value);
        }
        SecurityHeaders { headers }
    }

    /// The value of a header, or `None` when it was absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.as_deref())
    }

    /// How many of the fixed headers were present.
    pub fn present_count(&self) -> usize {
        self.headers.values().filter(|v| v.is_some()).count()
    }
}

/// Extracts the fixed header set from a response header map,
/// case-insensitively.
pub fn extract_security_headers(response_headers: &HeaderMap) -> SecurityHeaders {
    SecurityHeaders::from_pairs(SECURITY_HEADERS.iter().map(|&name| {
        let value = response_headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (name, value)
    }))
}

/// Fetches the target over HTTPS and reads its security headers.
///
/// `client` must be the limited-redirect client from initialization.
///
/// # Errors
///
/// Returns [`ProbeError::FetchFailed`] on any transport failure, redirect
/// loop, or non-success status.
pub async fn fetch_security_headers(
    target: &ScanTarget,
    client: &reqwest::Client,
) -> Result<SecurityHeaders, ProbeError> {
    let response = client
        .get(target.https_url())
        .send()
        .await
        .map_err(|e| ProbeError::FetchFailed(sanitize_error_message(&e.to_string())))?;

    if !response.status().is_success() {
        return Err(ProbeError::FetchFailed(format!(
            "{} returned HTTP {}",
            target.host(),
            response.status()
        )));
    }

    Ok(extract_security_headers(response.headers()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn test_extract_with_single_header_present() {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        );

        let result = extract_security_headers(&map);
        assert_eq!(result.headers.len(), 7);
        assert_eq!(result.present_count(), 1);
        assert_eq!(result.get("x-frame-options"), Some("DENY"));
        for name in SECURITY_HEADERS {
            assert!(result.headers.contains_key(*name));
        }
        assert_eq!(result.get("content-security-policy"), None);
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        // HeaderMap normalizes names on insert, so a response sent with any
        // casing matches the lowercase constant names
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_bytes(b"Strict-Transport-Security").unwrap(),
            HeaderValue::from_static("max-age=31536000"),
        );
        let result = extract_security_headers(&map);
        assert_eq!(
            result.get("strict-transport-security"),
            Some("max-age=31536000")
        );
    }

    #[test]
    fn test_all_keys_serialize_including_nulls() {
        let result = extract_security_headers(&HeaderMap::new());
        let json = serde_json::to_value(&result).unwrap();
        let map = json["headers"].as_object().unwrap();
        assert_eq!(map.len(), 7);
        assert!(map.values().all(|v| v.is_null()));
    }
}
