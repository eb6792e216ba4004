//! Tests for scan-target sanitation and validation through the public API.

use domain_posture::{ProbeErrorKind, ScanTarget};

#[test]
fn accepts_valid_hostnames() {
    for input in [
        "example.com",
        "sub.example.com",
        "a.b.c.example.co.uk",
        "my-site.example.org",
        "123start.example.net",
    ] {
        assert!(
            ScanTarget::parse(input).is_ok(),
            "expected '{input}' to validate"
        );
    }
}

#[test]
fn accepts_ipv4_literals() {
    for input in ["8.8.8.8", "1.1.1.1", "203.0.113.254"] {
        assert!(ScanTarget::parse(input).is_ok());
    }
}

#[test]
fn sanitizes_before_validating() {
    let cases = [
        ("https://www.example.com/some/path?q=1", "example.com"),
        ("http://example.com", "example.com"),
        ("  EXAMPLE.com\n", "example.com"),
        ("www.example.com", "example.com"),
        ("example.com#fragment", "example.com"),
    ];
    for (input, expected) in cases {
        assert_eq!(ScanTarget::parse(input).unwrap().host(), expected);
    }
}

#[test]
fn rejects_invalid_input_before_any_probe() {
    for input in [
        "",
        "   ",
        "not a domain.com",
        "example",
        "example.c",
        "example.42",
        "-bad.example.com",
        "bad-.example.com",
        "double..dot.com",
        "ftp://example.com",
        "256.0.0.1",
    ] {
        let error = ScanTarget::parse(input).expect_err(&format!("expected '{input}' to fail"));
        assert_eq!(error.kind(), ProbeErrorKind::Validation);
    }
}

#[test]
fn validation_error_carries_message() {
    let error = ScanTarget::parse("exa mple.com").unwrap_err();
    assert!(error.to_string().contains("exa mple.com"));
}
