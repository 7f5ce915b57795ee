//! Metrics definitions for the Credential Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `cs_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `method`: HTTP methods
//! - `endpoint`: the handful of known routes, everything else is `/other`
//! - `status`: success, error, timeout
//! - `role`: host, viewer
//! - `reason`: validation, signing

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used by
/// `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("cs_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record HTTP request completion.
///
/// Metric: `cs_http_requests_total`, `cs_http_request_duration_seconds`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("cs_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("cs_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Record a successfully issued join credential.
///
/// Metric: `cs_credentials_issued_total`
pub fn record_credential_issued(role: &'static str) {
    counter!("cs_credentials_issued_total", "role" => role).increment(1);
}

/// Record a rejected or failed credential request.
///
/// Metric: `cs_credential_failures_total`
pub fn record_credential_failure(reason: &'static str) {
    counter!("cs_credential_failures_total", "reason" => reason).increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/api/local-ip" => "/api/local-ip",
        "/api/token" => "/api/token",
        _ => "/other",
    }
}
