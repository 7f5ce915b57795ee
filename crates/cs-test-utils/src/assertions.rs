//! Custom test assertions for issued join credentials.

use crate::fixtures::TEST_API_SECRET;
use common::grants::JoinClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

/// Decode and verify a credential signed with [`TEST_API_SECRET`].
pub fn decode_test_credential(token: &str) -> JoinClaims {
    let result = decode::<JoinClaims>(
        token,
        &DecodingKey::from_secret(TEST_API_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    );
    assert!(
        result.is_ok(),
        "Credential did not verify with the test API secret: {:?}",
        result.as_ref().err()
    );
    result.unwrap().claims
}

/// Custom assertions for issued credentials.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_credential()
///     .assert_subscribe_only()
///     .assert_identity("viewer-1");
/// ```
pub trait CredentialAssertions {
    /// Assert that the credential verifies with the test secret.
    fn assert_valid_credential(&self) -> &Self;

    /// Assert publish and subscribe are both granted.
    fn assert_can_publish(&self) -> &Self;

    /// Assert subscribe is granted but publish is not.
    fn assert_subscribe_only(&self) -> &Self;

    /// Assert the granted room.
    fn assert_room(&self, room: &str) -> &Self;

    /// Assert the participant identity.
    fn assert_identity(&self, identity: &str) -> &Self;
}

impl CredentialAssertions for String {
    fn assert_valid_credential(&self) -> &Self {
        let claims = decode_test_credential(self);
        assert!(claims.video.room_join, "Credential must grant room join");
        assert!(claims.exp > claims.nbf, "Credential must expire after nbf");
        self
    }

    fn assert_can_publish(&self) -> &Self {
        let claims = decode_test_credential(self);
        assert!(claims.video.can_publish, "Expected publish permission");
        assert!(claims.video.can_subscribe, "Expected subscribe permission");
        self
    }

    fn assert_subscribe_only(&self) -> &Self {
        let claims = decode_test_credential(self);
        assert!(!claims.video.can_publish, "Expected no publish permission");
        assert!(claims.video.can_subscribe, "Expected subscribe permission");
        self
    }

    fn assert_room(&self, room: &str) -> &Self {
        let claims = decode_test_credential(self);
        assert_eq!(claims.video.room, room, "Unexpected room in grant");
        self
    }

    fn assert_identity(&self, identity: &str) -> &Self {
        let claims = decode_test_credential(self);
        assert_eq!(claims.sub, identity, "Unexpected identity");
        self
    }
}
