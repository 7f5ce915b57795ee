//! HTTP routes for the Credential Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::{AddressProbe, CredentialSigner, JwtCredentialSigner, SystemAddressProbe};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Join-credential signer.
    pub signer: Arc<dyn CredentialSigner>,

    /// Source of candidate LAN addresses.
    pub address_probe: Arc<dyn AddressProbe>,
}

impl AppState {
    /// State wired with the production signer and address probe.
    pub fn from_config(config: Config) -> Self {
        let signer = Arc::new(JwtCredentialSigner::from_config(&config));
        Self {
            config,
            signer,
            address_probe: Arc::new(SystemAddressProbe::default()),
        }
    }
}

/// Build the application routes.
///
/// - `/api/local-ip` - LAN address of this machine
/// - `/api/token` - mint a join credential
/// - `/health` - liveness probe
/// - `/metrics` - Prometheus metrics
///
/// Every route answers cross-origin requests, since the views are served
/// from another origin.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/api/local-ip", get(handlers::get_local_ip))
        .route("/api/token", post(handlers::issue_token))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer - answers preflight before tracing/timeout
    // 4. http_metrics_middleware (outermost) - records ALL responses
    api_routes
        .merge(metrics_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
}
