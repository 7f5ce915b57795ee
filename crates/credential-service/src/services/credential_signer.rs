//! Join-credential signing.
//!
//! Issues HS256 JWTs in the media server's access-token format (see
//! [`common::grants`]). The signer is a trait so that handlers can be tested
//! with a counting mock that proves validation failures never reach it.

use crate::config::Config;
use crate::errors::CsError;
use chrono::Utc;
use common::grants::{JoinClaims, VideoGrant};
use common::secret::{ExposeSecret, SecretString};
use common::types::Role;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::instrument;

/// Trait for credential issuance (enables mocking).
pub trait CredentialSigner: Send + Sync {
    /// Sign a credential admitting `identity` to the configured room.
    fn issue(&self, identity: &str, name: &str, role: Role) -> Result<SecretString, CsError>;
}

/// Signs join credentials with the media server API key and secret.
pub struct JwtCredentialSigner {
    api_key: Option<String>,
    api_secret: Option<SecretString>,
    room_name: String,
    ttl_seconds: i64,
}

impl JwtCredentialSigner {
    pub fn new(
        api_key: Option<String>,
        api_secret: Option<SecretString>,
        room_name: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            api_key,
            api_secret,
            room_name: room_name.into(),
            ttl_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_key.clone(),
            config.api_secret.clone(),
            config.room_name.clone(),
            config.token_ttl_seconds,
        )
    }

    /// The room every credential from this signer grants.
    pub fn room_name(&self) -> &str {
        &self.room_name
    }
}

impl CredentialSigner for JwtCredentialSigner {
    #[instrument(skip_all, fields(role = %role))]
    fn issue(&self, identity: &str, name: &str, role: Role) -> Result<SecretString, CsError> {
        let (api_key, api_secret) = match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(CsError::CredentialSigning(
                    "LIVEKIT_API_KEY and LIVEKIT_API_SECRET must be configured".to_string(),
                ))
            }
        };

        let claims = JoinClaims::new(
            api_key,
            identity,
            name,
            VideoGrant::for_role(self.room_name.as_str(), role),
            Utc::now().timestamp(),
            self.ttl_seconds,
        );

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let encoding_key = EncodingKey::from_secret(api_secret.expose_secret().as_bytes());

        let token = encode(&header, &claims, &encoding_key).map_err(|e| {
            CsError::CredentialSigning(format!("JWT signing operation failed: {}", e))
        })?;

        Ok(SecretString::from(token))
    }
}
