//! Credential Service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl, with a
//! body of the form `{ "error": "<message>" }`. Signing failures return a
//! generic message; the actual cause is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::types::ErrorResponse;
use thiserror::Error;

/// Message returned when `identity` or `name` is absent.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing identity or name";

/// Credential Service error type.
///
/// - Validation: 400 Bad Request
/// - CredentialSigning: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum CsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Credential signing error: {0}")]
    CredentialSigning(String),
}

impl CsError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            CsError::Validation(_) => 400,
            CsError::CredentialSigning(_) => 500,
        }
    }

    /// Bounded label for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CsError::Validation(_) => "validation",
            CsError::CredentialSigning(_) => "signing",
        }
    }
}

impl IntoResponse for CsError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CsError::Validation(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            CsError::CredentialSigning(err) => {
                tracing::error!(target: "cs.signing", error = %err, "Credential signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate token".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
