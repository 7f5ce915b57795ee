//! Fixed credentials and mock collaborators for Credential Service tests.

use common::secret::SecretString;
use common::types::Role;
use credential_service::errors::CsError;
use credential_service::services::{AddressProbe, CredentialSigner};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// API key every test server signs with.
pub const TEST_API_KEY: &str = "test-api-key";

/// API secret every test server signs with.
pub const TEST_API_SECRET: &str = "test-api-secret-0123456789abcdef";

/// Room every test server grants.
pub const TEST_ROOM_NAME: &str = "sala-local";

/// Environment for a test server with signing credentials configured.
pub fn test_config_vars() -> HashMap<String, String> {
    HashMap::from([
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("LIVEKIT_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ("LIVEKIT_API_SECRET".to_string(), TEST_API_SECRET.to_string()),
        ("ROOM_NAME".to_string(), TEST_ROOM_NAME.to_string()),
    ])
}

/// Environment for a test server with no signing credentials.
pub fn unsigned_config_vars() -> HashMap<String, String> {
    HashMap::from([("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string())])
}

/// Address probe returning a fixed candidate list.
#[derive(Debug, Clone, Default)]
pub struct FixedAddressProbe {
    candidates: Vec<IpAddr>,
}

impl FixedAddressProbe {
    pub fn new(candidates: Vec<IpAddr>) -> Self {
        Self { candidates }
    }

    /// A probe that finds nothing, forcing the fallback marker.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl AddressProbe for FixedAddressProbe {
    fn candidate_addresses(&self) -> Vec<IpAddr> {
        self.candidates.clone()
    }
}

/// Signer that counts invocations and returns a canned token or error.
pub struct CountingSigner {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingSigner {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of times `issue` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialSigner for CountingSigner {
    fn issue(&self, identity: &str, _name: &str, role: Role) -> Result<SecretString, CsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CsError::CredentialSigning("mock signer failure".to_string()));
        }
        Ok(SecretString::from(format!("mock-token-{}-{}", role, identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_counting_signer_counts() {
        let signer = CountingSigner::succeeding();
        assert_eq!(signer.call_count(), 0);
        signer.issue("host-1", "Host", Role::Host).unwrap();
        signer.issue("viewer-1", "Viewer", Role::Viewer).unwrap();
        assert_eq!(signer.call_count(), 2);
    }

    #[test]
    fn test_failing_signer_still_counts() {
        let signer = CountingSigner::failing();
        assert!(signer.issue("host-1", "Host", Role::Host).is_err());
        assert_eq!(signer.call_count(), 1);
    }

    #[test]
    fn test_fixed_probe() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 7));
        assert_eq!(FixedAddressProbe::new(vec![ip]).candidate_addresses(), vec![ip]);
        assert!(FixedAddressProbe::empty().candidate_addresses().is_empty());
    }
}
