//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over issued token strings. These decode
//! without verifying; pair them with the gateway when trust matters.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Canonical claim set as written by the issuer
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    #[expect(dead_code)] // Presence is part of the canonical schema check
    pub name: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

fn claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject(TEST_LEARNER_ID)
///     .assert_has_role("LEARNER")
///     .assert_expires_in(7200);
/// ```
pub trait TokenAssertions {
    /// Assert the token is an HS256 JWT carrying the canonical claim set
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the `sub` claim is the given principal id
    fn assert_for_subject(&self, id: i64) -> &Self;

    /// Assert the `role` claim
    fn assert_has_role(&self, role: &str) -> &Self;

    /// Assert the `email` claim
    fn assert_has_email(&self, email: &str) -> &Self;

    /// Assert `iss` and `aud`
    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self;

    /// Assert that `exp - iat` equals the given lifetime in seconds
    fn assert_lifetime(&self, seconds: i64) -> &Self;

    /// Assert that the token expires within the specified seconds of wall time
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Return the `jti` claim
    fn token_id(&self) -> String;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header: Result<JwtHeader, _> = serde_json::from_slice(&segment(self, 0));
        assert!(
            header.is_ok(),
            "Failed to parse JWT header JSON: {:?}",
            header.err()
        );

        let header = header.unwrap();
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims: Result<JwtClaims, _> = serde_json::from_slice(&segment(self, 1));
        assert!(
            claims.is_ok(),
            "Failed to parse canonical JWT claims: {:?}",
            claims.err()
        );
        assert!(!claims.unwrap().jti.is_empty(), "jti must be non-empty");

        self
    }

    fn assert_for_subject(&self, id: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.sub,
            id.to_string(),
            "Expected subject '{}', got '{}'",
            id,
            claims.sub
        );
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.role, role,
            "Expected role '{}', got '{}'",
            role, claims.role
        );
        self
    }

    fn assert_has_email(&self, email: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.email, email);
        self
    }

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.iss, issuer, "Unexpected issuer");
        assert_eq!(claims.aud, audience, "Unexpected audience");
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Expected lifetime of {} seconds, got {}",
            seconds,
            claims.exp - claims.iat
        );
        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims(self);
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for slow test machines
        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );
        self
    }

    fn token_id(&self) -> String {
        claims(self).jti
    }
}
