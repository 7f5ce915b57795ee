//! Credential Service configuration.
//!
//! Configuration is loaded from environment variables. The API secret is
//! held as a `SecretString` and redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default port, matching what the views expect out of the box.
pub const DEFAULT_PORT: u16 = 3001;

/// The single room every participant joins.
pub const DEFAULT_ROOM_NAME: &str = "sala-local";

/// Default join credential lifetime (6 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 6 * 60 * 60;

/// Upper bound for `TOKEN_TTL_SECONDS` (24 hours).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Credential Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:3001").
    pub bind_address: String,

    /// Media server API key, used as the credential issuer.
    ///
    /// Optional at startup; without it every issue request fails with 500.
    pub api_key: Option<String>,

    /// Media server API secret used to sign credentials.
    pub api_secret: Option<SecretString>,

    /// Room granted by every credential.
    pub room_name: String,

    /// Lifetime of issued credentials in seconds.
    pub token_ttl_seconds: i64,

    /// Seconds to keep serving in-flight requests after a shutdown signal.
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("api_key", &self.api_key)
            .field(
                "api_secret",
                &self.api_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("room_name", &self.room_name)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid token TTL configuration: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid drain configuration: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = match (vars.get("BIND_ADDRESS"), vars.get("PORT")) {
            (Some(address), _) => address.clone(),
            (None, Some(port_str)) => {
                let port: u16 = port_str.parse().map_err(|e| {
                    ConfigError::InvalidPort(format!(
                        "PORT must be a valid port number, got '{}': {}",
                        port_str, e
                    ))
                })?;
                format!("0.0.0.0:{}", port)
            }
            (None, None) => format!("0.0.0.0:{}", DEFAULT_PORT),
        };

        let api_key = vars
            .get("LIVEKIT_API_KEY")
            .filter(|v| !v.is_empty())
            .cloned();

        let api_secret = vars
            .get("LIVEKIT_API_SECRET")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let room_name = vars
            .get("ROOM_NAME")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_ROOM_NAME.to_string());

        let token_ttl_seconds = if let Some(value_str) = vars.get("TOKEN_TTL_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must not exceed {} seconds, got {}",
                    MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_TOKEN_TTL_SECONDS
        };

        let drain_seconds = match vars.get("CS_DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidDrain(format!(
                    "CS_DRAIN_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        Ok(Config {
            bind_address,
            api_key,
            api_secret,
            room_name,
            token_ttl_seconds,
            drain_seconds,
        })
    }

    /// Whether both signing credentials are present.
    pub fn has_signing_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }
}
