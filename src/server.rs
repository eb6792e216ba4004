//! HTTP API server.
//!
//! Exposes one endpoint per probe kind plus the orchestrated `/scan`, a
//! `/health` check, screenshot artifact serving, and a `/status` counters
//! endpoint. Every probe endpoint answers its JSON result on 200, an
//! `{"error": {"kind", "message"}}` body with 500 on probe failure, and
//! 400 when the submitted domain fails validation. The error envelope is
//! the same one a failed probe carries inside a `/scan` outcome.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::adapters::geolocation::lookup_ip_info;
use crate::adapters::malware::fetch_malware_report;
use crate::adapters::pagespeed::fetch_pagespeed;
use crate::adapters::ssl_grade::fetch_ssl_assessment;
use crate::config::Config;
use crate::error_handling::{ProbeError, ProbeErrorKind, ScanStats};
use crate::initialization::{init_client, init_header_client, init_resolver};
use crate::orchestrator::{run_scan, ProbeFailure, ScanContext};
use crate::probes::browser::capture_session;
use crate::probes::dns::resolve_records;
use crate::probes::headers::fetch_security_headers;
use crate::probes::ping::probe_reachability;
use crate::probes::ports::scan_ports;
use crate::target::ScanTarget;

#[derive(Deserialize)]
struct DomainQuery {
    domain: Option<String>,
}

#[derive(Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

/// Counters exposed by the `/status` endpoint.
#[derive(Serialize)]
struct StatusResponse {
    scans_started: usize,
    scans_completed: usize,
    total_probe_failures: usize,
    probe_failures: BTreeMap<&'static str, usize>,
}

/// Builds the API router over the shared scan context.
pub fn router(context: Arc<ScanContext>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ipinfo", get(ipinfo_handler))
        .route("/ping", get(ping_handler))
        .route("/ssl", get(ssl_handler))
        .route("/dns", get(dns_handler))
        .route("/ports", get(ports_handler))
        .route("/security-headers", get(security_headers_handler))
        .route("/malware", get(malware_handler))
        .route("/cookies", get(cookies_handler))
        .route("/pagespeed", get(pagespeed_handler))
        .route("/scan", get(scan_handler))
        .route("/status", get(status_handler))
        .route("/screenshots/:name", get(screenshot_handler))
        .with_state(context)
}

/// Initializes shared resources and serves the API until shutdown.
///
/// # Errors
///
/// Returns an error if a client cannot be built, the listener cannot bind,
/// or the server itself fails.
pub async fn run_server(config: Config) -> Result<()> {
    let client = init_client(&config).context("failed to initialize HTTP client")?;
    let header_client =
        init_header_client(&config).context("failed to initialize header client")?;
    let resolver = init_resolver();
    let stats = Arc::new(ScanStats::new());

    let addr = format!("{}:{}", config.bind, config.port);
    let context = Arc::new(ScanContext {
        client,
        header_client,
        resolver,
        config,
        stats,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    log::info!("API server listening on http://{addr}/");
    axum::serve(listener, router(context))
        .await
        .context("server error")?;

    Ok(())
}

/// Parses the `domain` query parameter, or produces the 400 response.
fn parse_target(param: Option<String>, param_name: &str) -> Result<ScanTarget, Response> {
    let raw = match param {
        Some(raw) => raw,
        None => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                &ProbeError::Validation(format!("{param_name} query parameter is required")),
            ))
        }
    };
    ScanTarget::parse(&raw).map_err(|e| error_response(StatusCode::BAD_REQUEST, &e))
}

fn error_response(status: StatusCode, error: &ProbeError) -> Response {
    let failure = ProbeFailure {
        kind: error.kind(),
        message: error.to_string(),
    };
    (status, Json(json!({ "error": failure }))).into_response()
}

/// Converts a single-probe result into its HTTP response, counting and
/// logging the failure if there was one.
fn probe_response<T: Serialize>(
    context: &ScanContext,
    probe: &str,
    result: Result<T, ProbeError>,
) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(error) => {
            context.stats.record_probe_failure(error.kind());
            log::warn!("{probe} probe failed: {error}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error)
        }
    }
}

async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

async fn ipinfo_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = lookup_ip_info(&target, &context.client, &context.resolver).await;
    probe_response(&context, "ipinfo", result)
}

async fn ping_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    // The reachability probe never fails; an unreachable host reports alive: false
    Json(probe_reachability(&target, &context.resolver).await).into_response()
}

async fn ssl_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = fetch_ssl_assessment(&target, &context.client).await;
    probe_response(&context, "ssl", result)
}

async fn dns_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = resolve_records(&target, &context.resolver).await;
    probe_response(&context, "dns", result)
}

async fn ports_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = scan_ports(&target, &context.resolver).await;
    probe_response(&context, "ports", result)
}

async fn security_headers_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = fetch_security_headers(&target, &context.header_client).await;
    probe_response(&context, "security-headers", result)
}

async fn malware_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = fetch_malware_report(
        &target,
        &context.client,
        context.config.virustotal_api_key.as_deref(),
    )
    .await;
    probe_response(&context, "malware", result)
}

async fn cookies_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<UrlQuery>,
) -> Response {
    let target = match parse_target(query.url, "url") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let result = capture_session(
        &target,
        &context.config.screenshot_dir,
        &context.config.user_agent,
    )
    .await;
    probe_response(&context, "cookies", result)
}

async fn pagespeed_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<UrlQuery>,
) -> Response {
    let url = match query.url {
        Some(url) => url,
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &ProbeError::Validation("url query parameter is required".to_string()),
            )
        }
    };
    let result = fetch_pagespeed(
        &url,
        &context.client,
        context.config.pagespeed_api_key.as_deref(),
    )
    .await;
    probe_response(&context, "pagespeed", result)
}

async fn scan_handler(
    State(context): State<Arc<ScanContext>>,
    Query(query): Query<DomainQuery>,
) -> Response {
    let target = match parse_target(query.domain, "domain") {
        Ok(target) => target,
        Err(response) => return response,
    };
    // Individual probe failures are part of the outcome; the consumer
    // decides how to render them, so the scan itself always answers 200
    let outcome = run_scan(&target, &context).await;
    Json(outcome).into_response()
}

async fn status_handler(State(context): State<Arc<ScanContext>>) -> Response {
    use strum::IntoEnumIterator;

    let probe_failures = ProbeErrorKind::iter()
        .map(|kind| (kind.as_str(), context.stats.probe_failure_count(kind)))
        .collect();

    Json(StatusResponse {
        scans_started: context.stats.scans_started(),
        scans_completed: context.stats.scans_completed(),
        total_probe_failures: context.stats.total_probe_failures(),
        probe_failures,
    })
    .into_response()
}

async fn screenshot_handler(
    State(context): State<Arc<ScanContext>>,
    Path(name): Path<String>,
) -> Response {
    // Artifact names are flat; anything path-like is rejected
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "screenshot not found" })),
        )
            .into_response();
    }

    let path = context.config.screenshot_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "screenshot not found" })),
        )
            .into_response(),
    }
}
