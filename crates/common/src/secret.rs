//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports [`secrecy`] so that every crate in the workspace holds API
//! secrets and issued join credentials the same way.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` and contains one is safe to log via `{:?}` or tracing.
//!
//! Use `SecretString` for:
//! - The media server API secret
//! - Issued join credentials (they are bearer proof for the room)
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let credential = SecretString::from("eyJhbGciOi...");
//! assert!(format!("{credential:?}").contains("REDACTED"));
//! assert_eq!(credential.expose_secret(), "eyJhbGciOi...");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("api-secret-value");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("api-secret-value"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("join-credential");
        assert_eq!(secret.expose_secret(), "join-credential");
    }

    #[test]
    fn test_deserialized_credential_is_redacted() {
        #[derive(Debug, Deserialize)]
        struct IssuedCredential {
            token: SecretString,
        }

        let json = r#"{"token": "header.payload.signature"}"#;
        let issued: IssuedCredential = serde_json::from_str(json).expect("deserialize");

        assert_eq!(issued.token.expose_secret(), "header.payload.signature");

        let debug = format!("{issued:?}");
        assert!(!debug.contains("header.payload.signature"));
        assert!(debug.contains("REDACTED"));
    }
}
