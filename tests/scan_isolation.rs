//! Integration test for the scan fan-out.
//!
//! Drives `run_scan` against the loopback address with no VirusTotal key
//! configured: the malware adapter fails before any request leaves the
//! process, while the probes that only need loopback sockets still
//! complete. This is the isolation guarantee consumers rely on - one
//! probe's failure never aborts or corrupts its siblings.

use std::sync::Arc;

use domain_posture::initialization::{init_client, init_header_client, init_resolver};
use domain_posture::orchestrator::{run_scan, ProbeOutcome, ScanContext};
use domain_posture::{Config, ProbeErrorKind, ScanStats, ScanTarget};

#[tokio::test]
async fn failed_probe_does_not_abort_siblings() {
    let screenshots = tempfile::tempdir().unwrap();
    let config = Config {
        virustotal_api_key: None,
        timeout_seconds: 2,
        screenshot_dir: screenshots.path().to_path_buf(),
        ..Config::default()
    };
    let context = ScanContext {
        client: init_client(&config).unwrap(),
        header_client: init_header_client(&config).unwrap(),
        resolver: init_resolver(),
        stats: Arc::new(ScanStats::new()),
        config,
    };
    let target = ScanTarget::parse("127.0.0.1").unwrap();

    let outcome = run_scan(&target, &context).await;

    assert_eq!(outcome.domain, "127.0.0.1");

    // The malware probe failed up front for want of an API key...
    match &outcome.malware {
        ProbeOutcome::Err { error } => {
            assert_eq!(error.kind, ProbeErrorKind::UpstreamFetchFailed);
            assert!(error.message.contains("API key"));
        }
        ProbeOutcome::Ok(_) => panic!("malware probe should fail without an API key"),
    }

    // ...while the probes that only need loopback sockets still completed
    let ports = outcome
        .ports
        .as_ok()
        .expect("port sweep should succeed on loopback");
    assert_eq!(ports.ip, "127.0.0.1");
    assert_eq!(ports.ports.len(), 11);

    let ping = outcome
        .ping
        .as_ok()
        .expect("reachability probe never fails");
    assert_eq!(ping.host, "127.0.0.1");

    assert!(!outcome.fully_failed());
    assert!(outcome.partially_failed());
    assert!(context
        .stats
        .probe_failure_count(ProbeErrorKind::UpstreamFetchFailed)
        >= 1);
    assert_eq!(context.stats.scans_completed(), 1);
}
