//! Configuration: compile-time constants and command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

// Probe timeouts
/// TCP connect timeout per probed port, in milliseconds
pub const PORT_CONNECT_TIMEOUT_MS: u64 = 2000;
/// Overall deadline for a browser session (launch + navigation + capture)
pub const BROWSER_SESSION_TIMEOUT: Duration = Duration::from_secs(60);
/// Reachability probe connect timeout, in milliseconds
pub const PING_TIMEOUT_MS: u64 = 2000;
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// Canonical port list probed per scan. The result sequence always matches
/// this order, regardless of which sockets complete first.
pub const PROBED_PORTS: [u16; 11] = [21, 22, 23, 25, 53, 80, 110, 143, 443, 3306, 8080];

/// Ports tried (in order) by the reachability probe.
pub const REACHABILITY_PORTS: [u16; 2] = [443, 80];

/// Maximum redirect hops followed by the security-header probe.
pub const MAX_HEADER_REDIRECTS: usize = 5;

/// Captured screenshots older than this are pruned on the next capture.
pub const SCREENSHOT_TTL: Duration = Duration::from_secs(3600);

/// Browser viewport for screenshot capture (width, height).
pub const BROWSER_VIEWPORT: (u32, u32) = (1366, 768);

// Security header names (lowercase, as matched against responses).
// The header probe always reports all seven; a missing header maps to null.
pub const HEADER_STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "content-security-policy";
pub const HEADER_X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
pub const HEADER_X_FRAME_OPTIONS: &str = "x-frame-options";
pub const HEADER_REFERRER_POLICY: &str = "referrer-policy";
pub const HEADER_PERMISSIONS_POLICY: &str = "permissions-policy";
pub const HEADER_X_XSS_PROTECTION: &str = "x-xss-protection";

/// The fixed set of security headers the header probe inspects.
pub const SECURITY_HEADERS: &[&str] = &[
    HEADER_STRICT_TRANSPORT_SECURITY,
    HEADER_CONTENT_SECURITY_POLICY,
    HEADER_X_CONTENT_TYPE_OPTIONS,
    HEADER_X_FRAME_OPTIONS,
    HEADER_REFERRER_POLICY,
    HEADER_PERMISSIONS_POLICY,
    HEADER_X_XSS_PROTECTION,
];

/// Default User-Agent string for HTTP requests and the browser session.
///
/// Uses a generic Chrome-like string; override via `--user-agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: human-readable format with colors (default)
/// - `Json`: structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// All options have defaults and can be overridden via flags; the upstream
/// API keys can also come from the environment (or a `.env` file).
///
/// # Examples
///
/// ```bash
/// # Basic usage
/// domain_posture
///
/// # Custom port, with a VirusTotal key from the environment
/// VIRUSTOTAL_API_KEY=... domain_posture --port 8000
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "domain_posture",
    about = "Probes a domain's security posture and serves the results over HTTP."
)]
pub struct Config {
    /// Address to bind the API server to
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to bind the API server to
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Directory where screenshot artifacts are written
    #[arg(long, value_parser, default_value = "./screenshots")]
    pub screenshot_dir: PathBuf,

    /// VirusTotal API key (required by the malware-reputation probe)
    #[arg(long, env = "VIRUSTOTAL_API_KEY", hide_env_values = true)]
    pub virustotal_api_key: Option<String>,

    /// Google PageSpeed API key (required by the page-speed probe)
    #[arg(long, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    pub pagespeed_api_key: Option<String>,

    /// Per-request timeout in seconds for the upstream HTTP adapters
    #[arg(long, default_value_t = 15)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1".to_string(),
            port: 5000,
            screenshot_dir: PathBuf::from("./screenshots"),
            virustotal_api_key: None,
            pagespeed_api_key: None,
            timeout_seconds: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
