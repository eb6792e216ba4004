//! Scan orchestrator: the multi-probe fan-out.
//!
//! Given one validated target, dispatches all eight probes concurrently
//! with `tokio::join!` - true parallel fan-out, not sequential - and
//! assembles one outcome per probe kind. Probes are isolated: a failure in
//! one is converted to its error outcome at the probe boundary and never
//! delays, cancels, or corrupts the others. There is no overall deadline
//! beyond each probe's own timeout; the orchestrator finishes when the
//! slowest probe does, and never short-circuits on partial results.

use std::sync::Arc;
use std::time::Instant;

use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;

use crate::adapters::geolocation::{lookup_ip_info, IpInfo};
use crate::adapters::malware::{fetch_malware_report, MalwareReport};
use crate::adapters::ssl_grade::{fetch_ssl_assessment, SslAssessment};
use crate::config::Config;
use crate::error_handling::{ProbeError, ProbeErrorKind, ScanStats};
use crate::probes::browser::{capture_session, CookieCapture};
use crate::probes::dns::{resolve_records, DnsRecords};
use crate::probes::headers::{fetch_security_headers, SecurityHeaders};
use crate::probes::ping::{probe_reachability, PingReport};
use crate::probes::ports::{scan_ports, PortScan};
use crate::score::{composite_score, CompositeScore};
use crate::target::ScanTarget;

/// Shared resources a scan needs: the adapter client (default-redirect,
/// 15 s timeout), the limited-redirect header client, the DNS resolver,
/// and configuration.
pub struct ScanContext {
    pub client: Arc<reqwest::Client>,
    pub header_client: Arc<reqwest::Client>,
    pub resolver: Arc<TokioAsyncResolver>,
    pub config: Config,
    pub stats: Arc<ScanStats>,
}

/// The serialized failure of a single probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeFailure {
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl From<ProbeError> for ProbeFailure {
    fn from(error: ProbeError) -> Self {
        ProbeFailure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// One probe's result within a scan: the success payload, or an `{error}`
/// object. Produced exactly once per probe kind per scan and immutable
/// afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeOutcome<T> {
    Ok(T),
    Err { error: ProbeFailure },
}

impl<T> ProbeOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok(_))
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            ProbeOutcome::Ok(value) => Some(value),
            ProbeOutcome::Err { .. } => None,
        }
    }
}

impl<T> From<Result<T, ProbeError>> for ProbeOutcome<T> {
    fn from(result: Result<T, ProbeError>) -> Self {
        match result {
            Ok(value) => ProbeOutcome::Ok(value),
            Err(error) => ProbeOutcome::Err {
                error: error.into(),
            },
        }
    }
}

/// The aggregate result of one scan: one outcome per probe kind, plus the
/// composite score when both of its inputs succeeded.
#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub domain: String,
    pub ip_info: ProbeOutcome<IpInfo>,
    pub ping: ProbeOutcome<PingReport>,
    pub ssl: ProbeOutcome<SslAssessment>,
    pub dns: ProbeOutcome<DnsRecords>,
    pub ports: ProbeOutcome<PortScan>,
    pub security_headers: ProbeOutcome<SecurityHeaders>,
    pub malware: ProbeOutcome<MalwareReport>,
    pub cookies: ProbeOutcome<CookieCapture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<CompositeScore>,
    pub elapsed_ms: u128,
}

impl ScanOutcome {
    fn probe_flags(&self) -> [bool; 8] {
        [
            self.ip_info.is_ok(),
            self.ping.is_ok(),
            self.ssl.is_ok(),
            self.dns.is_ok(),
            self.ports.is_ok(),
            self.security_headers.is_ok(),
            self.malware.is_ok(),
            self.cookies.is_ok(),
        ]
    }

    /// True when every probe failed - the consumer renders "service
    /// unreachable" rather than "some data unavailable".
    pub fn fully_failed(&self) -> bool {
        self.probe_flags().iter().all(|ok| !ok)
    }

    /// True when at least one probe failed but not all of them did.
    pub fn partially_failed(&self) -> bool {
        let flags = self.probe_flags();
        flags.iter().any(|ok| !ok) && flags.iter().any(|ok| *ok)
    }
}

/// Runs all eight probes for one target concurrently and assembles the
/// outcome.
///
/// The port probe and the geolocation adapter each perform their own
/// forward DNS lookup, so a transient resolver failure affects them
/// independently rather than atomically together.
pub async fn run_scan(target: &ScanTarget, context: &ScanContext) -> ScanOutcome {
    let started = Instant::now();
    context.stats.record_scan_started();
    log::info!("scanning {}", target.host());

    let (ip_info, ping, ssl, dns, ports, security_headers, malware, cookies) = tokio::join!(
        lookup_ip_info(target, &context.client, &context.resolver),
        async { Ok::<_, ProbeError>(probe_reachability(target, &context.resolver).await) },
        fetch_ssl_assessment(target, &context.client),
        resolve_records(target, &context.resolver),
        scan_ports(target, &context.resolver),
        fetch_security_headers(target, &context.header_client),
        fetch_malware_report(
            target,
            &context.client,
            context.config.virustotal_api_key.as_deref(),
        ),
        capture_session(
            target,
            &context.config.screenshot_dir,
            &context.config.user_agent,
        ),
    );

    let score = composite_score(security_headers.as_ref().ok(), ssl.as_ref().ok());

    let outcome = ScanOutcome {
        domain: target.host().to_string(),
        ip_info: record(&context.stats, target, "ipinfo", ip_info),
        ping: record(&context.stats, target, "ping", ping),
        ssl: record(&context.stats, target, "ssl", ssl),
        dns: record(&context.stats, target, "dns", dns),
        ports: record(&context.stats, target, "ports", ports),
        security_headers: record(&context.stats, target, "security-headers", security_headers),
        malware: record(&context.stats, target, "malware", malware),
        cookies: record(&context.stats, target, "cookies", cookies),
        score,
        elapsed_ms: started.elapsed().as_millis(),
    };

    context.stats.record_scan_completed();
    if outcome.fully_failed() {
        log::warn!("scan of {} failed on every probe", target.host());
    } else {
        log::info!(
            "scan of {} finished in {}ms",
            target.host(),
            outcome.elapsed_ms
        );
    }

    outcome
}

/// Converts one probe result into its outcome, logging and counting the
/// failure if there was one.
fn record<T>(
    stats: &ScanStats,
    target: &ScanTarget,
    probe: &str,
    result: Result<T, ProbeError>,
) -> ProbeOutcome<T> {
    if let Err(error) = &result {
        stats.record_probe_failure(error.kind());
        log::warn!("{probe} probe failed for {}: {error}", target.host());
    }
    result.into()
}
