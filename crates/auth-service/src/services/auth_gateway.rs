use crate::clock::Clock;
use crate::config::Config;
use crate::crypto;
use crate::errors::{AuthError, RejectReason};
use crate::models::{AuthenticatedPrincipal, PrincipalIdentity};
use crate::observability::{hash_for_correlation, metrics};
use crate::services::revocation_registry::RevocationRegistry;
use chrono::DateTime;
use common::jwt::validate_iat_at;
use common::secret::{ExposeSecret, SecretBox};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Single entry point that turns a presented token into an authenticated
/// principal.
///
/// Checks run in order and stop at the first failure:
/// 1. size, signature, issuer and audience
/// 2. expiry (strict: expired once now reaches `exp`)
/// 3. `iat` no further ahead than the clock skew allowance
/// 4. `jti` present and non-empty
/// 5. not revoked
pub struct VerificationGateway {
    signing_key: SecretBox<Vec<u8>>,
    issuer: String,
    audience: String,
    clock_skew: Duration,
    registry: Arc<RevocationRegistry>,
    clock: Arc<dyn Clock>,
}

impl VerificationGateway {
    pub fn new(config: &Config, registry: Arc<RevocationRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            signing_key: SecretBox::new(Box::new(config.signing_key.expose_secret().clone())),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            clock_skew: config.clock_skew,
            registry,
            clock,
        }
    }

    /// Authenticate a bearer token.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidToken` carrying the first failed check. Its
    /// display message is identical for every reason.
    #[instrument(skip_all)]
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        match self.check(token) {
            Ok(principal) => {
                metrics::record_token_validation(None);
                tracing::debug!(
                    target: "auth.gateway",
                    subject = %hash_for_correlation(&principal.identity.id.to_string()),
                    role = %principal.identity.role,
                    "Token accepted"
                );
                Ok(principal)
            }
            Err(reason) => {
                metrics::record_token_validation(Some(reason));
                tracing::debug!(target: "auth.gateway", reason = %reason, "Token rejected");
                Err(AuthError::InvalidToken(reason))
            }
        }
    }

    fn check(&self, token: &str) -> Result<AuthenticatedPrincipal, RejectReason> {
        let claims = crypto::verify_jwt(
            token,
            self.signing_key.expose_secret(),
            &self.issuer,
            &self.audience,
        )?;

        let now = self.clock.now();

        if now.timestamp() >= claims.exp {
            return Err(RejectReason::Expired);
        }

        validate_iat_at(claims.iat, self.clock_skew, now.timestamp())
            .map_err(|_| RejectReason::IssuedInFuture)?;

        let token_id = claims
            .jti
            .filter(|jti| !jti.is_empty())
            .ok_or(RejectReason::MissingClaim)?;

        if self.registry.is_revoked(&token_id) {
            tracing::info!(
                target: "auth.gateway",
                token_id = %hash_for_correlation(&token_id),
                "Revoked token presented"
            );
            return Err(RejectReason::Revoked);
        }

        let id: i64 = claims.sub.parse().map_err(|_| RejectReason::Malformed)?;
        if id < 1 || claims.email.is_empty() {
            return Err(RejectReason::MissingClaim);
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(RejectReason::Malformed)?;

        Ok(AuthenticatedPrincipal {
            identity: PrincipalIdentity {
                id,
                email: claims.email,
                role: claims.role,
                display_name: claims.name,
            },
            token_id,
            expires_at,
        })
    }
}

impl std::fmt::Debug for VerificationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGateway")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty token.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let scheme = header.get(..7)?;
    if !scheme.eq_ignore_ascii_case("bearer ") {
        return None;
    }

    let token = header.get(7..)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
