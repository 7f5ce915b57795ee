//! # Credential Service Test Utilities
//!
//! This crate provides:
//! - Fixed signing credentials and config vars for reproducible tests
//! - Mock signer and address probe (`CountingSigner`, `FixedAddressProbe`)
//! - Server test harness (`TestCredentialServer` for E2E tests)
//! - Custom assertions on issued credentials (`CredentialAssertions`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestCredentialServer::spawn().await?;
//!     let token = server.issue("host-1", "Host", "host").await?;
//!
//!     token.assert_valid_credential()
//!          .assert_can_publish()
//!          .assert_room(TEST_ROOM_NAME);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
