//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, MAX_HEADER_REDIRECTS};

/// Initializes the HTTP client used by the upstream adapters.
///
/// Configured with the User-Agent and per-request timeout from the
/// configuration (15 s default) and reqwest's default redirect policy.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the client used by the security-header probe.
///
/// Same timeout and User-Agent as the adapter client, but redirects are
/// capped at 5 hops: the header probe reads the headers of wherever the
/// target settles, and a longer chain is treated as a fetch failure.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_header_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::limited(MAX_HEADER_REDIRECTS))
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
