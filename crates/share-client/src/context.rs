//! Application context.
//!
//! Built once per application instance and handed to every view by `Arc`.
//! There is no global session: a second context is a second, independent
//! participant.

use crate::config::ClientConfig;
use crate::credentials::CredentialClient;
use crate::errors::ShareError;
use crate::identity::generate_identity;
use crate::session::RoomSession;
use crate::transport::Transport;
use common::types::Role;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct AppContext {
    config: ClientConfig,
    credentials: CredentialClient,
    session: RoomSession,
}

impl AppContext {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Arc<Self>, ShareError> {
        let credentials = CredentialClient::new(&config)?;
        let session = RoomSession::new(transport, config.signaling_url.clone());
        Ok(Arc::new(Self {
            config,
            credentials,
            session,
        }))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialClient {
        &self.credentials
    }

    pub fn session(&self) -> &RoomSession {
        &self.session
    }

    /// Join the room as `role` unless already connected.
    ///
    /// A fresh identity and credential are requested for every attempt.
    #[instrument(skip_all, fields(role = %role))]
    pub async fn ensure_connected(&self, role: Role) -> Result<(), ShareError> {
        if self.session.is_connected() {
            return Ok(());
        }

        let identity = generate_identity(role);
        debug!(target: "share.context", identity = %identity, "Requesting join credential");

        let credential = self
            .credentials
            .issue_credential(&identity, role.display_name(), role)
            .await?;

        self.session.connect(&credential).await?;
        Ok(())
    }
}
