//! Join-credential claims.
//!
//! A join credential is an HS256 JWT signed with the media server's API
//! secret. Its layout follows the media server's access-token format:
//!
//! ```text
//! {
//!   "iss": "<api key>",
//!   "sub": "<identity>",
//!   "jti": "<identity>",
//!   "name": "<display name>",
//!   "nbf": 1700000000,
//!   "exp": 1700021600,
//!   "video": { "roomJoin": true, "room": "sala-local", "canPublish": true, "canSubscribe": true }
//! }
//! ```
//!
//! The `sub` and `jti` fields carry client identities and are redacted in
//! Debug output.

use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room permissions carried by a join credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room_join: bool,
    pub room: String,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

impl VideoGrant {
    /// Grant for joining `room` with the given role.
    ///
    /// Subscribe is always granted; publish only for [`Role::Host`].
    #[must_use]
    pub fn for_role(room: impl Into<String>, role: Role) -> Self {
        Self {
            room_join: true,
            room: room.into(),
            can_publish: role.can_publish(),
            can_subscribe: true,
        }
    }
}

/// Claims of a join credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct JoinClaims {
    /// API key of the issuing service.
    pub iss: String,

    /// Participant identity - redacted in Debug output.
    pub sub: String,

    /// Token id; the media server uses the identity here.
    pub jti: String,

    /// Display name shown to other participants.
    pub name: String,

    /// Not-before timestamp (Unix epoch seconds).
    pub nbf: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    pub video: VideoGrant,
}

impl fmt::Debug for JoinClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinClaims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("name", &self.name)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("video", &self.video)
            .finish()
    }
}

impl JoinClaims {
    /// Build claims valid from `now` for `ttl_seconds`.
    #[must_use]
    pub fn new(
        api_key: &str,
        identity: &str,
        name: &str,
        grant: VideoGrant,
        now: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            iss: api_key.to_string(),
            sub: identity.to_string(),
            jti: identity.to_string(),
            name: name.to_string(),
            nbf: now,
            exp: now.saturating_add(ttl_seconds),
            video: grant,
        }
    }

    /// Identity of the participant this credential admits.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.sub
    }
}
