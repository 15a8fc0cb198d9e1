use crate::clock::Clock;
use crate::config::Config;
use crate::crypto;
use crate::errors::AuthError;
use crate::models::{Claims, PrincipalIdentity};
use crate::observability::{hash_for_correlation, metrics};
use chrono::{DateTime, Utc};
use common::jwt::decode_payload_unverified;
use common::secret::{ExposeSecret, SecretBox};
use std::sync::Arc;
use tracing::instrument;

/// Mints signed credentials for authenticated principals.
///
/// The issuer never consults the revocation registry; a freshly minted
/// `jti` cannot already be revoked.
pub struct TokenIssuer {
    signing_key: SecretBox<Vec<u8>>,
    issuer: String,
    audience: String,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            signing_key: SecretBox::new(Box::new(config.signing_key.expose_secret().clone())),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.token_ttl,
            clock,
        }
    }

    /// Lifetime stamped on every credential.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issue a credential for the principal.
    ///
    /// # Errors
    ///
    /// - `InvalidPrincipal` - id below 1
    /// - `Crypto` - signing failed
    #[instrument(skip_all, fields(role = %identity.role))]
    pub fn issue(&self, identity: &PrincipalIdentity) -> Result<String, AuthError> {
        if identity.id < 1 {
            metrics::record_token_issuance(identity.role, "error");
            return Err(AuthError::InvalidPrincipal(format!(
                "Principal id must be positive, got {}",
                identity.id
            )));
        }

        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            metrics::record_token_issuance(identity.role, "error");
            AuthError::Internal
        })?;
        let jti = crypto::generate_token_id();

        let claims = Claims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            name: identity.display_name.clone(),
            jti: Some(jti.clone()),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = match crypto::sign_jwt(&claims, self.signing_key.expose_secret()) {
            Ok(token) => token,
            Err(e) => {
                metrics::record_token_issuance(identity.role, "error");
                return Err(e);
            }
        };

        metrics::record_token_issuance(identity.role, "success");
        tracing::info!(
            target: "auth.token",
            subject = %hash_for_correlation(&claims.sub),
            token_id = %hash_for_correlation(&jti),
            role = %identity.role,
            expires_at = %expires_at,
            "Token issued"
        );

        Ok(token)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Read `(jti, expires_at)` from a token without checking its signature.
///
/// Only used to revoke a token the caller already holds. Returns `None` for
/// anything that is not a structurally valid token carrying a non-empty
/// `jti` and an integer `exp`.
pub fn read_unverified(token: &str) -> Option<(String, DateTime<Utc>)> {
    let payload = decode_payload_unverified(token).ok()?;

    let jti = payload
        .get("jti")
        .and_then(serde_json::Value::as_str)
        .filter(|jti| !jti.is_empty())?;

    let exp = payload.get("exp").and_then(serde_json::Value::as_i64)?;
    let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)?;

    Some((jti.to_string(), expires_at))
}
