//! Scan target sanitation and validation.
//!
//! User input is sanitized (trimmed, lowercased, scheme/`www.`/path
//! stripped) and validated against a hostname grammar or a dotted-quad
//! IPv4 pattern before any probe runs. Invalid input never reaches the
//! orchestrator.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error_handling::ProbeError;

/// Hostname grammar: labels of 1-63 alphanumerics/hyphens with no leading
/// or trailing hyphen, and a final label that is alphabetic and at least
/// two characters.
const HOSTNAME_PATTERN: &str =
    r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$";

/// Dotted-quad IPv4 literal.
const IPV4_PATTERN: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$";

fn hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HOSTNAME_PATTERN).expect("hostname pattern is valid"))
}

fn ipv4_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IPV4_PATTERN).expect("ipv4 pattern is valid"))
}

/// A validated domain name or IPv4 literal, ready to be probed.
///
/// Constructed only via [`ScanTarget::parse`], so holding one is proof the
/// input passed sanitation and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanTarget(String);

impl ScanTarget {
    /// Sanitizes and validates raw user input into a scan target.
    ///
    /// Sanitation: trim surrounding whitespace, lowercase, strip a leading
    /// `http://`/`https://` scheme, a leading `www.`, and anything from the
    /// first `/`, `?`, or `#` onward.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Validation`] when the sanitized input matches
    /// neither the hostname grammar nor a dotted-quad IPv4 literal.
    pub fn parse(input: &str) -> Result<ScanTarget, ProbeError> {
        let mut host = input.trim().to_lowercase();

        for scheme in ["https://", "http://"] {
            if let Some(rest) = host.strip_prefix(scheme) {
                host = rest.to_string();
                break;
            }
        }

        if let Some(idx) = host.find(['/', '?', '#']) {
            host.truncate(idx);
        }

        if let Some(rest) = host.strip_prefix("www.") {
            host = rest.to_string();
        }

        if host.is_empty() {
            return Err(ProbeError::Validation("domain is required".to_string()));
        }

        if host.chars().any(|c| c.is_whitespace()) {
            return Err(ProbeError::Validation(format!(
                "invalid domain '{host}': contains whitespace"
            )));
        }

        if ipv4_regex().is_match(&host) || hostname_regex().is_match(&host) {
            Ok(ScanTarget(host))
        } else {
            Err(ProbeError::Validation(format!(
                "invalid domain '{host}': not a valid hostname or IPv4 address"
            )))
        }
    }

    /// The validated host, without scheme or path.
    pub fn host(&self) -> &str {
        &self.0
    }

    /// The HTTPS URL form of the target, as used by the header and browser
    /// probes.
    pub fn https_url(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_hostnames() {
        assert_eq!(ScanTarget::parse("example.com").unwrap().host(), "example.com");
        assert_eq!(
            ScanTarget::parse("sub.domain.example.co.uk").unwrap().host(),
            "sub.domain.example.co.uk"
        );
        assert_eq!(
            ScanTarget::parse("xn--bcher-kva.example").unwrap().host(),
            "xn--bcher-kva.example"
        );
    }

    #[test]
    fn test_accepts_ipv4_literals() {
        assert_eq!(ScanTarget::parse("8.8.8.8").unwrap().host(), "8.8.8.8");
        assert_eq!(
            ScanTarget::parse("203.0.113.254").unwrap().host(),
            "203.0.113.254"
        );
    }

    #[test]
    fn test_sanitizes_scheme_www_and_path() {
        assert_eq!(
            ScanTarget::parse("https://www.example.com/path?q=1#frag")
                .unwrap()
                .host(),
            "example.com"
        );
        assert_eq!(
            ScanTarget::parse("http://example.com/").unwrap().host(),
            "example.com"
        );
        assert_eq!(
            ScanTarget::parse("  Example.COM  ").unwrap().host(),
            "example.com"
        );
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(ScanTarget::parse("").is_err());
        assert!(ScanTarget::parse("   ").is_err());
        assert!(ScanTarget::parse("exa mple.com").is_err());
        assert!(ScanTarget::parse("example").is_err()); // no TLD
        assert!(ScanTarget::parse("example.c").is_err()); // TLD too short
        assert!(ScanTarget::parse("example.123").is_err()); // numeric TLD
        assert!(ScanTarget::parse("-example.com").is_err()); // leading hyphen
        assert!(ScanTarget::parse("example-.com").is_err()); // trailing hyphen
        assert!(ScanTarget::parse("example..com").is_err()); // empty label
        assert!(ScanTarget::parse("ftp://example.com").is_err()); // unknown scheme
    }

    #[test]
    fn test_rejects_overlong_labels() {
        let label = "a".repeat(64);
        assert!(ScanTarget::parse(&format!("{label}.com")).is_err());
        let ok_label = "a".repeat(63);
        assert!(ScanTarget::parse(&format!("{ok_label}.com")).is_ok());
    }

    #[test]
    fn test_rejects_malformed_ipv4() {
        assert!(ScanTarget::parse("256.1.1.1").is_err());
        assert!(ScanTarget::parse("1.2.3").is_err());
        assert!(ScanTarget::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn test_https_url() {
        let target = ScanTarget::parse("example.com").unwrap();
        assert_eq!(target.https_url(), "https://example.com");
    }
}
