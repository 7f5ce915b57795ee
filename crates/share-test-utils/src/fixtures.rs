//! Client fixtures.

use share_client::config::ClientConfig;
use std::time::Duration;

/// Upper bound for waiting on asynchronous view updates in tests.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client configuration pointing at a test credential service.
pub fn client_config(credential_service_url: &str) -> ClientConfig {
    ClientConfig {
        credential_service_url: credential_service_url.trim_end_matches('/').to_string(),
        http_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    }
}
