//! Liveness endpoint.
//!
//! The service has no dependencies worth probing: signing material is
//! checked per request, so `/health` only reports that the process serves.

/// Liveness probe handler.
pub async fn health_check() -> &'static str {
    "OK"
}
