//! Test server harness for E2E testing
//!
//! Provides `TestCredentialServer` for spawning real Credential Service
//! instances in tests.

use crate::fixtures::{test_config_vars, FixedAddressProbe};
use common::types::{ErrorResponse, LocalIpResponse, TokenRequest, TokenResponse};
use credential_service::config::Config;
use credential_service::routes::{self, AppState};
use credential_service::services::{AddressProbe, CredentialSigner, JwtCredentialSigner};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Shared metrics handle for every test server in the process.
///
/// The global recorder can only be installed once; later callers get a
/// standalone recorder's handle.
pub fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            routes::init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// Test harness for spawning the Credential Service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<(), anyhow::Error> {
///     let server = TestCredentialServer::spawn().await?;
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestCredentialServer {
    addr: SocketAddr,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestCredentialServer {
    /// Spawn a server signing with the test key pair.
    ///
    /// The address probe reports no LAN address, so `/api/local-ip`
    /// answers with the fallback marker.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(test_config_vars()).await
    }

    /// Spawn a server configured from `vars`.
    pub async fn spawn_with_vars(vars: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;
        let signer = Arc::new(JwtCredentialSigner::from_config(&config));
        Self::spawn_with_state(AppState {
            config,
            signer,
            address_probe: Arc::new(FixedAddressProbe::empty()),
        })
        .await
    }

    /// Spawn a server with a custom signer and address probe.
    pub async fn spawn_with(
        signer: Arc<dyn CredentialSigner>,
        address_probe: Arc<dyn AddressProbe>,
    ) -> Result<Self, anyhow::Error> {
        let config = Config::from_vars(&test_config_vars())
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;
        Self::spawn_with_state(AppState {
            config,
            signer,
            address_probe,
        })
        .await
    }

    async fn spawn_with_state(state: AppState) -> Result<Self, anyhow::Error> {
        let config = state.config.clone();
        let app = routes::build_routes(Arc::new(state), test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request a credential and return the raw token, failing on non-200.
    pub async fn issue(
        &self,
        identity: &str,
        name: &str,
        role: &str,
    ) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/token", self.url()))
            .json(&TokenRequest {
                identity: Some(identity.to_string()),
                name: Some(name.to_string()),
                role: Some(role.into()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorResponse = response.json().await?;
            anyhow::bail!("token request failed with {}: {}", status, body.error);
        }

        let body: TokenResponse = response.json().await?;
        Ok(body.token)
    }

    /// Fetch `/api/local-ip`.
    pub async fn local_ip(&self) -> Result<String, anyhow::Error> {
        let body: LocalIpResponse = self
            .client
            .get(format!("{}/api/local-ip", self.url()))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.ip)
    }
}

impl Drop for TestCredentialServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestCredentialServer::spawn().await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(format!("{}/health", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "OK");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_provides_addr() -> Result<(), anyhow::Error> {
        let server = TestCredentialServer::spawn().await?;
        let addr = server.addr();

        assert!(addr.ip().is_loopback());
        assert!(addr.port() > 0);
        assert_eq!(server.url(), format!("http://{}", addr));

        Ok(())
    }

    #[tokio::test]
    async fn test_server_uses_test_config() -> Result<(), anyhow::Error> {
        let server = TestCredentialServer::spawn().await?;

        assert!(server.config().has_signing_credentials());
        assert_eq!(server.config().room_name, crate::fixtures::TEST_ROOM_NAME);

        Ok(())
    }
}
