//! Builder patterns for forging test tokens
//!
//! The production issuer only ever produces well-formed credentials. These
//! builders produce everything else: missing claims, wrong issuers, foreign
//! keys, other algorithms.

use crate::test_ids::{TEST_AUDIENCE, TEST_ISSUER, TEST_LEARNER_EMAIL, TEST_LEARNER_ID};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for arbitrary JWT claim sets
///
/// Defaults to a canonical, valid learner claim set issued at `now` and
/// expiring an hour later.
///
/// # Example
/// ```rust,ignore
/// let token = TestClaimsBuilder::at(clock.timestamp())
///     .for_principal(42)
///     .with_role("ORGANIZATION")
///     .expires_in(-1)
///     .sign(&test_signing_key(1));
/// ```
#[derive(Debug, Clone)]
pub struct TestClaimsBuilder {
    now: i64,
    claims: Map<String, Value>,
}

impl TestClaimsBuilder {
    /// Builder anchored at the current wall time.
    pub fn new() -> Self {
        Self::at(chrono::Utc::now().timestamp())
    }

    /// Builder anchored at an explicit unix timestamp.
    pub fn at(now: i64) -> Self {
        let claims = json!({
            "sub": TEST_LEARNER_ID.to_string(),
            "email": TEST_LEARNER_EMAIL,
            "role": "LEARNER",
            "name": "Test Student",
            "jti": uuid::Uuid::new_v4().to_string(),
            "iat": now,
            "exp": now + 3600,
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
        });

        let Value::Object(claims) = claims else {
            unreachable!("json! object literal")
        };

        Self { now, claims }
    }

    pub fn for_principal(self, id: i64) -> Self {
        self.with_claim("sub", id.to_string())
    }

    pub fn with_role(self, role: &str) -> Self {
        self.with_claim("role", role)
    }

    pub fn with_email(self, email: &str) -> Self {
        self.with_claim("email", email)
    }

    pub fn with_jti(self, jti: &str) -> Self {
        self.with_claim("jti", jti)
    }

    pub fn with_issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", issuer)
    }

    pub fn with_audience(self, audience: &str) -> Self {
        self.with_claim("aud", audience)
    }

    /// Set expiration in seconds relative to the anchor time.
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = self.now + seconds;
        self.with_claim("exp", exp)
    }

    /// Set issued-at in seconds relative to the anchor time.
    pub fn issued_in(self, seconds: i64) -> Self {
        let iat = self.now + seconds;
        self.with_claim("iat", iat)
    }

    /// Set or replace any claim.
    pub fn with_claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Remove a claim entirely.
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }

    /// Sign with HS256.
    pub fn sign(self, key: &[u8]) -> String {
        self.sign_with(Algorithm::HS256, key)
    }

    /// Sign with another HMAC algorithm (HS384, HS512).
    pub fn sign_with(self, algorithm: Algorithm, key: &[u8]) -> String {
        let header = Header::new(algorithm);
        encode(&header, &self.build(), &EncodingKey::from_secret(key))
            .expect("HMAC signing never fails")
    }

    /// Emit an unsigned token (`alg: none`, empty signature segment).
    pub fn unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build().to_string());
        format!("{header}.{payload}.")
    }
}

impl Default for TestClaimsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the payload segment of `token` while keeping its header and
/// signature. The result must fail signature verification.
pub fn splice_payload(token: &str, claims: &Value) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token must have 3 segments");
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.{}", parts[0], payload, parts[2])
}
