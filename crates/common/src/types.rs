//! HTTP wire types shared by the credential service and its clients.
//!
//! ```text
//! GET  /api/local-ip  -> 200 { "ip": "192.168.1.20" }
//! POST /api/token     { "identity": "...", "name": "...", "role": "host" | "viewer" }
//!                     -> 200 { "token": "<jwt>" }
//!                     -> 400 { "error": "Missing identity or name" }
//!                     -> 500 { "error": "Failed to generate token" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker returned by `/api/local-ip` when no LAN IPv4 address is bound.
pub const FALLBACK_LOCAL_ADDRESS: &str = "localhost";

/// Permission tier of a participant.
///
/// A host may publish tracks; a viewer may only subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Viewer,
}

impl Role {
    /// Interpret the `role` field of a token request.
    ///
    /// Only the exact value `host` grants the host role. Anything else,
    /// including an absent field, is a viewer.
    #[must_use]
    pub fn from_request_value(value: Option<&str>) -> Self {
        match value {
            Some("host") => Role::Host,
            _ => Role::Viewer,
        }
    }

    /// Whether a credential for this role carries publish permission.
    #[must_use]
    pub fn can_publish(self) -> bool {
        matches!(self, Role::Host)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Viewer => "viewer",
        }
    }

    /// Display name used when a view requests a credential for this role.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Host => "Host",
            Role::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/token`.
///
/// Every field is optional on the wire so that the service can answer a
/// missing `identity` or `name` with its own validation error. `role`
/// accepts any JSON value; only the string `host` means host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
}

impl TokenRequest {
    #[must_use]
    pub fn new(identity: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            identity: Some(identity.into()),
            name: Some(name.into()),
            role: Some(Value::String(role.as_str().to_string())),
        }
    }

    /// Identity, if present and non-empty.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref().filter(|s| !s.is_empty())
    }

    /// Display name, if present and non-empty.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_request_value(self.role.as_ref().and_then(Value::as_str))
    }
}

/// Body of a successful `POST /api/token`.
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Body of `GET /api/local-ip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIpResponse {
    pub ip: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_literal_host_is_host() {
        assert_eq!(Role::from_request_value(Some("host")), Role::Host);
        assert_eq!(Role::from_request_value(Some("viewer")), Role::Viewer);
        assert_eq!(Role::from_request_value(Some("HOST")), Role::Viewer);
        assert_eq!(Role::from_request_value(Some("admin")), Role::Viewer);
        assert_eq!(Role::from_request_value(None), Role::Viewer);
    }

    #[test]
    fn test_publish_permission_follows_role() {
        assert!(Role::Host.can_publish());
        assert!(!Role::Viewer.can_publish());
    }

    #[test]
    fn test_empty_fields_count_as_missing() {
        let request: TokenRequest =
            serde_json::from_str(r#"{"identity": "", "name": "Host", "role": "host"}"#).unwrap();
        assert_eq!(request.identity(), None);
        assert_eq!(request.name(), Some("Host"));
        assert_eq!(request.role(), Role::Host);
    }

    #[test]
    fn test_absent_fields_deserialize() {
        let request: TokenRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.identity(), None);
        assert_eq!(request.name(), None);
        assert_eq!(request.role(), Role::Viewer);
    }

    #[test]
    fn test_non_string_role_is_viewer() {
        for body in [
            r#"{"identity": "v-1", "name": "Viewer", "role": 1}"#,
            r#"{"identity": "v-1", "name": "Viewer", "role": true}"#,
            r#"{"identity": "v-1", "name": "Viewer", "role": null}"#,
            r#"{"identity": "v-1", "name": "Viewer", "role": ["host"]}"#,
            r#"{"identity": "v-1", "name": "Viewer", "role": {"name": "host"}}"#,
        ] {
            let request: TokenRequest = serde_json::from_str(body).unwrap();
            assert_eq!(request.identity(), Some("v-1"));
            assert_eq!(request.role(), Role::Viewer, "body: {body}");
        }
    }

    #[test]
    fn test_token_request_serializes_role_as_string() {
        let request = TokenRequest::new("viewer-1", "Viewer", Role::Viewer);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["identity"], "viewer-1");
        assert_eq!(json["name"], "Viewer");
        assert_eq!(json["role"], "viewer");
    }

    #[test]
    fn test_token_response_debug_redacts_token() {
        let response = TokenResponse {
            token: "secret-jwt".to_string(),
        };
        let debug = format!("{response:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-jwt"));
    }
}
