//! domain_posture library: website security-posture scanning.
//!
//! Given a domain, this library concurrently probes multiple independent
//! signals - DNS records, IP geolocation, reachability, TLS grade, HTTP
//! security headers, malware reputation, and a live-browser cookie and
//! screenshot capture - and assembles a per-probe result set. Probes are
//! isolated: each enforces its own timeout and a failure in one never
//! delays or corrupts the others. A composite security score is derived
//! from the header set and the TLS grade.
//!
//! # Example
//!
//! ```no_run
//! use domain_posture::{run_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     port: 5000,
//!     ..Default::default()
//! };
//! run_server(config).await
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The browser-session probe needs
//! a Chrome or Chromium binary on the host; every other probe works
//! without one.

pub mod adapters;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod orchestrator;
pub mod probes;
pub mod score;
pub mod server;
pub mod target;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ProbeError, ProbeErrorKind, ScanStats};
pub use orchestrator::{run_scan, ProbeFailure, ProbeOutcome, ScanContext, ScanOutcome};
pub use score::{composite_score, CompositeScore};
pub use server::run_server;
pub use target::ScanTarget;
