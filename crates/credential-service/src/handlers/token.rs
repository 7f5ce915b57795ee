//! `POST /api/token`.

use crate::errors::{CsError, MISSING_FIELDS_MESSAGE};
use crate::observability::metrics::{record_credential_failure, record_credential_issued};
use crate::routes::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use common::secret::ExposeSecret;
use common::types::{TokenRequest, TokenResponse};
use std::sync::Arc;
use tracing::{debug, info};

/// Mint a join credential for `{identity, name, role}`.
///
/// - 400 if `identity` or `name` is missing or empty, or the body is not JSON.
///   The signer is never invoked in that case.
/// - 500 if signing fails (e.g. API secret not configured).
/// - 200 `{ "token": "<jwt>" }` otherwise. Publish is granted only for
///   `role == "host"`.
#[tracing::instrument(skip_all, name = "cs.token.issue")]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, CsError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(target: "cs.handlers.token", error = %rejection, "Rejected token request body");
        record_credential_failure("validation");
        CsError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    })?;

    let (identity, name) = match (request.identity(), request.name()) {
        (Some(identity), Some(name)) => (identity, name),
        _ => {
            debug!(target: "cs.handlers.token", "Token request missing identity or name");
            record_credential_failure("validation");
            return Err(CsError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
    };

    let role = request.role();

    let token = state
        .signer
        .issue(identity, name, role)
        .inspect_err(|e| record_credential_failure(e.reason()))?;

    record_credential_issued(role.as_str());
    info!(
        target: "cs.handlers.token",
        role = %role,
        room = %state.config.room_name,
        "Issued join credential"
    );

    Ok(Json(TokenResponse {
        token: token.expose_secret().to_string(),
    }))
}
