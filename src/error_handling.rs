//! Probe error taxonomy and scan statistics.
//!
//! Every probe-level failure is caught at the probe boundary and converted
//! into a [`ProbeError`]; it never aborts sibling probes within the same
//! scan. There are no retries anywhere: a single failure is final for that
//! probe within that scan.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Maximum length of an error message carried in a probe result.
const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

/// A failure of a single probe within a scan.
///
/// Each variant carries a human-readable message; the stable wire
/// identifier comes from [`ProbeError::kind`].
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The submitted domain failed validation; no probe ran.
    #[error("{0}")]
    Validation(String),

    /// The resolver returned an error or no answer.
    #[error("DNS resolution failed: {0}")]
    DnsResolutionFailed(String),

    /// A third-party HTTP adapter failed (transport error, timeout, or non-2xx).
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),

    /// The direct security-header fetch failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// The headless browser session failed to launch, navigate, or capture.
    #[error("browser session failed: {0}")]
    BrowserSessionFailed(String),
}

impl ProbeError {
    /// The stable error-kind identifier for this failure.
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ProbeError::Validation(_) => ProbeErrorKind::Validation,
            ProbeError::DnsResolutionFailed(_) => ProbeErrorKind::DnsResolutionFailed,
            ProbeError::UpstreamFetchFailed(_) => ProbeErrorKind::UpstreamFetchFailed,
            ProbeError::FetchFailed(_) => ProbeErrorKind::FetchFailed,
            ProbeError::BrowserSessionFailed(_) => ProbeErrorKind::BrowserSessionFailed,
        }
    }
}

/// Stable identifiers for probe failure kinds, as exposed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
pub enum ProbeErrorKind {
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "DNS_RESOLUTION_FAILED")]
    DnsResolutionFailed,
    #[serde(rename = "UPSTREAM_FETCH_FAILED")]
    UpstreamFetchFailed,
    #[serde(rename = "FETCH_FAILED")]
    FetchFailed,
    #[serde(rename = "BROWSER_SESSION_FAILED")]
    BrowserSessionFailed,
}

impl ProbeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorKind::Validation => "VALIDATION_ERROR",
            ProbeErrorKind::DnsResolutionFailed => "DNS_RESOLUTION_FAILED",
            ProbeErrorKind::UpstreamFetchFailed => "UPSTREAM_FETCH_FAILED",
            ProbeErrorKind::FetchFailed => "FETCH_FAILED",
            ProbeErrorKind::BrowserSessionFailed => "BROWSER_SESSION_FAILED",
        }
    }
}

/// Sanitizes an error message before it is carried in a probe result.
///
/// Removes control characters (0x00-0x1F except newline/tab/carriage
/// return) and truncates to `MAX_ERROR_MESSAGE_LENGTH` characters.
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized: String = message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 || code == 0x09 || code == 0x0A || code == 0x0D || code > 0x7F
        })
        .collect();

    if sanitized.chars().count() > MAX_ERROR_MESSAGE_LENGTH {
        let mut truncated: String = sanitized.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
        truncated.push_str("... (truncated)");
        truncated
    } else {
        sanitized
    }
}

/// Thread-safe scan statistics tracker.
///
/// Tracks scan counts and per-kind probe failures using atomic counters,
/// allowing concurrent access from request handlers. Shared across tasks
/// via `Arc`.
pub struct ScanStats {
    scans_started: AtomicUsize,
    scans_completed: AtomicUsize,
    probe_failures: HashMap<ProbeErrorKind, AtomicUsize>,
}

impl ScanStats {
    pub fn new() -> Self {
        let mut probe_failures = HashMap::new();
        for kind in ProbeErrorKind::iter() {
            probe_failures.insert(kind, AtomicUsize::new(0));
        }
        ScanStats {
            scans_started: AtomicUsize::new(0),
            scans_completed: AtomicUsize::new(0),
            probe_failures,
        }
    }

    pub fn record_scan_started(&self) {
        self.scans_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_completed(&self) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_probe_failure(&self, kind: ProbeErrorKind) {
        // All kinds are initialized in new(), so unwrap() is safe
        self.probe_failures
            .get(&kind)
            .unwrap()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn scans_started(&self) -> usize {
        self.scans_started.load(Ordering::SeqCst)
    }

    pub fn scans_completed(&self) -> usize {
        self.scans_completed.load(Ordering::SeqCst)
    }

    pub fn probe_failure_count(&self, kind: ProbeErrorKind) -> usize {
        self.probe_failures.get(&kind).unwrap().load(Ordering::SeqCst)
    }

    pub fn total_probe_failures(&self) -> usize {
        ProbeErrorKind::iter()
            .map(|kind| self.probe_failure_count(kind))
            .sum()
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}
