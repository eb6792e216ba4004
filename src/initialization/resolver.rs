//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;

/// Initializes the shared DNS resolver.
///
/// Uses the default resolver configuration with tightened timeouts so a
/// slow or unresponsive DNS server fails the DNS-dependent probes quickly
/// instead of hanging a scan. One instance is shared across all probes,
/// but each DNS-dependent probe performs its own lookups.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2; // fail faster than the default
    opts.ndots = 0; // never append search domains to probed hosts

    Arc::new(TokioAsyncResolver::tokio(ResolverConfig::default(), opts))
}
