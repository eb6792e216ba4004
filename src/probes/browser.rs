//! Browser-session cookie/screenshot probe.
//!
//! Launches an isolated headless Chrome session over CDP, navigates to the
//! HTTPS form of the target, captures a viewport screenshot, and reads all
//! cookies visible to the session. Cookies and screenshot are returned
//! together or not at all; browser teardown happens on success and failure
//! paths alike. Each artifact gets a scan-scoped filename and stale
//! artifacts are pruned on capture, so concurrent scans never overwrite
//! each other.

use std::path::Path;
use std::time::SystemTime;

use anyhow::Context;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieSameSite};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chrono::Utc;
use futures::StreamExt;
use serde::Serialize;

use crate::config::{BROWSER_SESSION_TIMEOUT, BROWSER_VIEWPORT, SCREENSHOT_TTL};
use crate::error_handling::{sanitize_error_message, ProbeError};
use crate::target::ScanTarget;

/// Cookie classification, derived once at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CookieClass {
    #[serde(rename = "Session Cookie")]
    Session,
    #[serde(rename = "Authentication Cookie")]
    Authentication,
    #[serde(rename = "Tracking Cookie")]
    Tracking,
    #[serde(rename = "Other")]
    Other,
}

enum CookieField {
    Name,
    Domain,
}

enum MatchKind {
    Contains,
    StartsWith,
}

struct ClassificationRule {
    field: CookieField,
    matcher: MatchKind,
    pattern: &'static str,
    class: CookieClass,
}

/// Ordered classification rules, evaluated first-match-wins. Name-based
/// rules precede the domain-based one, so a session cookie set by a
/// tracking domain still classifies as Session.
const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        field: CookieField::Name,
        matcher: MatchKind::Contains,
        pattern: "session",
        class: CookieClass::Session,
    },
    ClassificationRule {
        field: CookieField::Name,
        matcher: MatchKind::Contains,
        pattern: "auth",
        class: CookieClass::Authentication,
    },
    ClassificationRule {
        field: CookieField::Name,
        matcher: MatchKind::Contains,
        pattern: "track",
        class: CookieClass::Tracking,
    },
    ClassificationRule {
        field: CookieField::Domain,
        matcher: MatchKind::Contains,
        pattern: "google",
        class: CookieClass::Tracking,
    },
    ClassificationRule {
        field: CookieField::Name,
        matcher: MatchKind::StartsWith,
        pattern: "_ga",
        class: CookieClass::Tracking,
    },
];

/// Classifies a cookie from its name and domain using the ordered rule
/// table.
pub fn classify_cookie(name: &str, domain: &str) -> CookieClass {
    let name = name.to_lowercase();
    let domain = domain.to_lowercase();
    for rule in CLASSIFICATION_RULES {
        let subject = match rule.field {
            CookieField::Name => name.as_str(),
            CookieField::Domain => domain.as_str(),
        };
        let matched = match rule.matcher {
            MatchKind::Contains => subject.contains(rule.pattern),
            MatchKind::StartsWith => subject.starts_with(rule.pattern),
        };
        if matched {
            return rule.class;
        }
    }
    CookieClass::Other
}

/// One captured cookie with its derived classification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(rename = "type")]
    pub classification: CookieClass,
}

/// The session capture: classified cookies plus the scan-scoped screenshot
/// URL.
#[derive(Debug, Clone, Serialize)]
pub struct CookieCapture {
    pub cookies: Vec<CookieRecord>,
    pub screenshot: String,
}

fn cookie_record(cookie: Cookie) -> CookieRecord {
    let classification = classify_cookie(&cookie.name, &cookie.domain);
    CookieRecord {
        name: cookie.name,
        domain: cookie.domain,
        secure: cookie.secure,
        http_only: cookie.http_only,
        same_site: cookie.same_site.map(same_site_label),
        // CDP reports -1 for session cookies with no expiry
        expires: (cookie.expires >= 0.0).then_some(cookie.expires),
        classification,
    }
}

fn same_site_label(same_site: CookieSameSite) -> &'static str {
    match same_site {
        CookieSameSite::Strict => "Strict",
        CookieSameSite::Lax => "Lax",
        CookieSameSite::None => "None",
    }
}

/// Captures cookies and a screenshot from a fresh headless session.
///
/// The whole session (launch, navigation, capture) runs under one
/// 60-second deadline. If the deadline fires, dropping the session future
/// tears the browser child process down.
///
/// # Errors
///
/// Returns [`ProbeError::BrowserSessionFailed`] on launch, navigation, or
/// capture failure, with the underlying message attached.
pub async fn capture_session(
    target: &ScanTarget,
    screenshot_dir: &Path,
    user_agent: &str,
) -> Result<CookieCapture, ProbeError> {
    match tokio::time::timeout(
        BROWSER_SESSION_TIMEOUT,
        run_session(target, screenshot_dir, user_agent),
    )
    .await
    {
        Ok(Ok(capture)) => Ok(capture),
        Ok(Err(e)) => Err(ProbeError::BrowserSessionFailed(sanitize_error_message(
            &format!("{e:#}"),
        ))),
        Err(_) => Err(ProbeError::BrowserSessionFailed(format!(
            "session timed out after {}s",
            BROWSER_SESSION_TIMEOUT.as_secs()
        ))),
    }
}

async fn run_session(
    target: &ScanTarget,
    screenshot_dir: &Path,
    user_agent: &str,
) -> anyhow::Result<CookieCapture> {
    let (width, height) = BROWSER_VIEWPORT;
    let browser_config = BrowserConfig::builder()
        .window_size(width, height)
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .build()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid browser configuration")?;

    let (mut browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    // The CDP event loop must be polled for the session to make progress
    let event_loop = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = drive_session(&browser, target, screenshot_dir, user_agent).await;

    // Teardown on success and failure paths alike
    if let Err(e) = browser.close().await {
        log::debug!("browser close failed for {}: {e}", target.host());
    }
    let _ = browser.wait().await;
    event_loop.abort();

    result
}

async fn drive_session(
    browser: &Browser,
    target: &ScanTarget,
    screenshot_dir: &Path,
    user_agent: &str,
) -> anyhow::Result<CookieCapture> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to open page")?;
    page.set_user_agent(user_agent)
        .await
        .context("failed to set user agent")?;

    let url = target.https_url();
    page.goto(url.as_str())
        .await
        .with_context(|| format!("navigation to {url} failed"))?;
    page.wait_for_navigation()
        .await
        .context("page never reached a settled state")?;

    tokio::fs::create_dir_all(screenshot_dir)
        .await
        .context("failed to create screenshot directory")?;
    prune_stale_artifacts(screenshot_dir).await;

    let filename = format!("{}-{}.png", target.host(), Utc::now().timestamp_millis());
    let path = screenshot_dir.join(&filename);
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build(),
        &path,
    )
    .await
    .context("screenshot capture failed")?;

    let cookies = page
        .get_cookies()
        .await
        .context("cookie read failed")?
        .into_iter()
        .map(cookie_record)
        .collect();

    Ok(CookieCapture {
        cookies,
        screenshot: format!("/screenshots/{filename}"),
    })
}

/// Removes artifacts older than the screenshot TTL. Best-effort: pruning
/// failures are logged at debug and never fail the capture.
async fn prune_stale_artifacts(screenshot_dir: &Path) {
    let mut entries = match tokio::fs::read_dir(screenshot_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("screenshot prune skipped: {e}");
            return;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let stale = entry
            .metadata()
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map(|age| age > SCREENSHOT_TTL)
            .unwrap_or(false);
        if stale {
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                log::debug!("failed to prune {}: {e}", entry.path().display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_classifies_session() {
        assert_eq!(classify_cookie("sessionid", "example.com"), CookieClass::Session);
        assert_eq!(classify_cookie("JSESSIONID", "example.com"), CookieClass::Session);
    }

    #[test]
    fn test_auth_name_classifies_authentication() {
        assert_eq!(
            classify_cookie("auth_token", "example.com"),
            CookieClass::Authentication
        );
    }

    #[test]
    fn test_tracking_matches() {
        assert_eq!(
            classify_cookie("_ga_tracking", "example.com"),
            CookieClass::Tracking
        );
        assert_eq!(classify_cookie("_ga", "example.com"), CookieClass::Tracking);
        assert_eq!(
            classify_cookie("prefs", ".google.com"),
            CookieClass::Tracking
        );
    }

    #[test]
    fn test_name_rules_take_precedence_over_domain() {
        // A session cookie served from a google domain is still a session
        // cookie: name rules come first in the table.
        assert_eq!(
            classify_cookie("sessionid", ".google.com"),
            CookieClass::Session
        );
        assert_eq!(
            classify_cookie("auth", ".google.com"),
            CookieClass::Authentication
        );
    }

    #[test]
    fn test_unmatched_classifies_other() {
        assert_eq!(classify_cookie("prefs", "example.com"), CookieClass::Other);
    }

    #[test]
    fn test_classification_serializes_as_labels() {
        assert_eq!(
            serde_json::to_string(&CookieClass::Tracking).unwrap(),
            "\"Tracking Cookie\""
        );
        assert_eq!(serde_json::to_string(&CookieClass::Other).unwrap(), "\"Other\"");
    }

    #[tokio::test]
    async fn test_prune_removes_only_stale_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("old.png");
        let fresh = dir.path().join("new.png");
        std::fs::write(&stale, b"png").unwrap();
        std::fs::write(&fresh, b"png").unwrap();

        // Age the stale file past the TTL
        let old = SystemTime::now() - (SCREENSHOT_TTL * 2);
        let file = std::fs::File::options().write(true).open(&stale).unwrap();
        file.set_modified(old).unwrap();
        drop(file);

        prune_stale_artifacts(dir.path()).await;

        assert!(!stale.exists());
        assert!(fresh.exists());
    }
}
