//! `GET /api/local-ip`.

use crate::routes::AppState;
use crate::services::resolve_local_address;
use axum::extract::State;
use axum::Json;
use common::types::LocalIpResponse;
use std::sync::Arc;
use tracing::debug;

/// Report this machine's LAN IPv4 address.
///
/// Always 200; when no LAN address exists the body carries the fallback
/// marker `localhost`.
#[tracing::instrument(skip_all, name = "cs.local_ip")]
pub async fn get_local_ip(State(state): State<Arc<AppState>>) -> Json<LocalIpResponse> {
    let ip = resolve_local_address(state.address_probe.as_ref());
    debug!(target: "cs.handlers.local_ip", ip = %ip, "Resolved local address");
    Json(LocalIpResponse { ip })
}
