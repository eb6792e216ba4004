//! Page-speed adapter (Google PageSpeed Insights v5).
//!
//! Passthrough adapter: the upstream body is returned as-is for the
//! consumer to render. Requires an API key, supplied via configuration.

use serde_json::Value;

use crate::adapters::send_for_json;
use crate::error_handling::ProbeError;

const PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Runs a PageSpeed analysis for the given URL.
///
/// The URL is passed through as submitted (the query builder handles
/// encoding); an URL without a scheme gets `https://` prefixed.
///
/// # Errors
///
/// Returns [`ProbeError::UpstreamFetchFailed`] when no API key is
/// configured, or on any transport failure or non-2xx answer.
pub async fn fetch_pagespeed(
    url: &str,
    client: &reqwest::Client,
    api_key: Option<&str>,
) -> Result<Value, ProbeError> {
    let api_key = api_key.ok_or_else(|| {
        ProbeError::UpstreamFetchFailed("no PageSpeed API key configured".to_string())
    })?;

    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    send_for_json(
        client
            .get(PAGESPEED_ENDPOINT)
            .query(&[("url", url.as_str()), ("key", api_key)]),
    )
    .await
}
