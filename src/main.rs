//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_posture` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use domain_posture::initialization::init_logger_with;
use domain_posture::{run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load API keys and overrides from a .env file when present
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if config.virustotal_api_key.is_none() {
        log::warn!("no VirusTotal API key configured; the malware probe will report failures");
    }
    if config.pagespeed_api_key.is_none() {
        log::warn!("no PageSpeed API key configured; /pagespeed will report failures");
    }

    if let Err(e) = run_server(config).await {
        eprintln!("domain_posture error: {e:#}");
        process::exit(1);
    }
    Ok(())
}
