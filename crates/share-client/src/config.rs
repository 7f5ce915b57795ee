//! Client configuration.
//!
//! Both views need the credential service address and the media server
//! signaling endpoint. The host additionally builds the viewer-facing link
//! from the LAN address, the viewer port and the viewer path.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CREDENTIAL_SERVICE_URL: &str = "http://localhost:3001";

pub const DEFAULT_SIGNALING_URL: &str = "ws://localhost:7880";

/// Port the static views are served from.
pub const DEFAULT_VIEWER_PORT: u16 = 8080;

pub const DEFAULT_VIEWER_PATH: &str = "/viewer";

pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the credential service, without trailing slash.
    pub credential_service_url: String,

    /// Media server signaling endpoint.
    pub signaling_url: String,

    /// Port in the share link handed to viewers.
    pub viewer_port: u16,

    /// Path in the share link, always starting with `/`.
    pub viewer_path: String,

    /// Timeout for credential service requests.
    pub http_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credential_service_url: DEFAULT_CREDENTIAL_SERVICE_URL.to_string(),
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            viewer_port: DEFAULT_VIEWER_PORT,
            viewer_path: DEFAULT_VIEWER_PATH.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let credential_service_url = match vars.get("CREDENTIAL_SERVICE_URL") {
            Some(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::InvalidUrl(format!(
                        "CREDENTIAL_SERVICE_URL must be an http(s) URL, got '{}'",
                        url
                    )));
                }
                url.trim_end_matches('/').to_string()
            }
            None => DEFAULT_CREDENTIAL_SERVICE_URL.to_string(),
        };

        let signaling_url = match vars.get("LIVEKIT_WS_URL") {
            Some(url) => {
                if !url.starts_with("ws://") && !url.starts_with("wss://") {
                    return Err(ConfigError::InvalidUrl(format!(
                        "LIVEKIT_WS_URL must be a ws(s) URL, got '{}'",
                        url
                    )));
                }
                url.clone()
            }
            None => DEFAULT_SIGNALING_URL.to_string(),
        };

        let viewer_port = match vars.get("VIEWER_PORT") {
            Some(port_str) => port_str.parse().map_err(|e| {
                ConfigError::InvalidPort(format!(
                    "VIEWER_PORT must be a valid port number, got '{}': {}",
                    port_str, e
                ))
            })?,
            None => DEFAULT_VIEWER_PORT,
        };

        let viewer_path = match vars.get("VIEWER_PATH").filter(|v| !v.is_empty()) {
            Some(path) if path.starts_with('/') => path.clone(),
            Some(path) => format!("/{}", path),
            None => DEFAULT_VIEWER_PATH.to_string(),
        };

        let http_timeout = match vars.get("HTTP_TIMEOUT_SECONDS") {
            Some(value_str) => {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidTimeout(format!(
                        "HTTP_TIMEOUT_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;
                if value == 0 {
                    return Err(ConfigError::InvalidTimeout(
                        "HTTP_TIMEOUT_SECONDS must be positive".to_string(),
                    ));
                }
                Duration::from_secs(value)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        };

        Ok(Self {
            credential_service_url,
            signaling_url,
            viewer_port,
            viewer_path,
            http_timeout,
        })
    }

    /// Link viewers open to watch the stream, e.g. `http://192.168.1.20:8080/viewer`.
    pub fn share_link(&self, lan_address: &str) -> String {
        format!(
            "http://{}:{}{}",
            lan_address, self.viewer_port, self.viewer_path
        )
    }
}
