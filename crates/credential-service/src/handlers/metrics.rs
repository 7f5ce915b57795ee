//! Prometheus metrics endpoint handler.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus text format, e.g.
/// ```text
/// # TYPE cs_credentials_issued_total counter
/// cs_credentials_issued_total{role="host"} 3
/// ```
#[tracing::instrument(skip_all, name = "cs.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
