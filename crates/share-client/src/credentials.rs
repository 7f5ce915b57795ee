//! Credential service client.
//!
//! Wraps `GET /api/local-ip` and `POST /api/token`. Every failure,
//! including a non-2xx answer, surfaces as [`ShareError::Network`]; the
//! server's `{ "error" }` text is kept in the message when present.

use crate::config::ClientConfig;
use crate::errors::ShareError;
use common::secret::SecretString;
use common::types::{ErrorResponse, LocalIpResponse, Role, TokenRequest, TokenResponse};
use reqwest::Response;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection timeout for credential service requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the credential service.
#[derive(Debug, Clone)]
pub struct CredentialClient {
    base_url: String,
    http: reqwest::Client,
}

impl CredentialClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ShareError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ShareError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.credential_service_url.clone(),
            http,
        })
    }

    /// LAN address of the machine running the credential service.
    #[instrument(skip_all)]
    pub async fn fetch_local_ip(&self) -> Result<String, ShareError> {
        let url = format!("{}/api/local-ip", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(target: "share.credentials", error = %e, url = %url, "Local IP request failed");
            ShareError::Network(e.to_string())
        })?;

        let body: LocalIpResponse = parse_success(response).await?;
        debug!(target: "share.credentials", ip = %body.ip, "Fetched local IP");
        Ok(body.ip)
    }

    /// Request a join credential for `identity`.
    #[instrument(skip_all, fields(role = %role))]
    pub async fn issue_credential(
        &self,
        identity: &str,
        name: &str,
        role: Role,
    ) -> Result<SecretString, ShareError> {
        let url = format!("{}/api/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&TokenRequest::new(identity, name, role))
            .send()
            .await
            .map_err(|e| {
                warn!(target: "share.credentials", error = %e, url = %url, "Token request failed");
                ShareError::Network(e.to_string())
            })?;

        let body: TokenResponse = parse_success(response).await?;
        debug!(target: "share.credentials", identity = %identity, "Received join credential");
        Ok(SecretString::from(body.token))
    }
}

async fn parse_success<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ShareError> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(|e| {
            warn!(target: "share.credentials", error = %e, "Invalid credential service response");
            ShareError::Network(format!("Invalid response: {}", e))
        });
    }

    let detail = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };

    warn!(
        target: "share.credentials",
        status = %status,
        error = %detail,
        "Credential service returned an error"
    );
    Err(ShareError::Network(format!(
        "Status {}: {}",
        status.as_u16(),
        detail
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> CredentialClient {
        CredentialClient::new(&ClientConfig {
            credential_service_url: base_url.to_string(),
            http_timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_local_ip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/local-ip"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ip": "192.168.1.20"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let ip = client(&mock_server.uri()).fetch_local_ip().await.unwrap();
        assert_eq!(ip, "192.168.1.20");
    }

    #[tokio::test]
    async fn test_issue_credential_sends_role_and_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_json(serde_json::json!({
                "identity": "host-1",
                "name": "Host",
                "role": "host"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "signed-jwt"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = client(&mock_server.uri())
            .issue_credential("host-1", "Host", Role::Host)
            .await
            .unwrap();
        assert_eq!(token.expose_secret(), "signed-jwt");
    }

    #[tokio::test]
    async fn test_error_body_is_kept() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "Failed to generate token"})),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri())
            .issue_credential("viewer-1", "Viewer", Role::Viewer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ShareError::Network("Status 500: Failed to generate token".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_json_error_uses_status_reason() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/local-ip"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri()).fetch_local_ip().await.unwrap_err();
        assert_eq!(err, ShareError::Network("Status 502: Bad Gateway".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/local-ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri()).fetch_local_ip().await.unwrap_err();
        assert!(matches!(err, ShareError::Network(msg) if msg.starts_with("Invalid response")));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Nothing listens on port 9 of localhost in the test environment.
        let err = client("http://127.0.0.1:9")
            .fetch_local_ip()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
