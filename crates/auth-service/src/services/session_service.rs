//! Session flows built on the credential core: login, registration with
//! auto-login, logout and password change.
//!
//! Persistence is the caller's job. This service takes the stored record in
//! and hands new hashes back out.

use crate::crypto::{self, CredentialHasher, MAX_PASSWORD_BYTES};
use crate::errors::{AuthError, RejectReason};
use crate::models::{normalize_email, PrincipalIdentity, StoredCredential, TokenResponse};
use crate::observability::{hash_for_correlation, metrics, ErrorCategory};
use crate::services::auth_gateway::{extract_bearer, VerificationGateway};
use crate::services::revocation_registry::RevocationRegistry;
use crate::services::token_service::{read_unverified, TokenIssuer};
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const TOKEN_TYPE: &str = "Bearer";

/// Verified against when the principal does not exist, so an unknown
/// account costs the same bcrypt work as a wrong password.
const DUMMY_PASSWORD: &str = "pathfinder-timing-equalizer";

pub struct SessionService {
    issuer: Arc<TokenIssuer>,
    hasher: CredentialHasher,
    gateway: Arc<VerificationGateway>,
    registry: Arc<RevocationRegistry>,
    dummy_hash: String,
}

impl SessionService {
    /// # Errors
    ///
    /// `AuthError::Crypto` if the timing-equalizer hash cannot be computed.
    pub fn new(
        issuer: Arc<TokenIssuer>,
        hasher: CredentialHasher,
        gateway: Arc<VerificationGateway>,
        registry: Arc<RevocationRegistry>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            issuer,
            hasher,
            gateway,
            registry,
            dummy_hash,
        })
    }

    /// Authenticate a principal by password and mint a token.
    ///
    /// `stored` is whatever the persistence layer found for the submitted
    /// email. Unknown principal and wrong password fail identically.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        stored: Option<StoredCredential>,
        password: &SecretString,
    ) -> Result<TokenResponse, AuthError> {
        let result = self.login_inner(stored, password).await;
        observe("login", result)
    }

    async fn login_inner(
        &self,
        stored: Option<StoredCredential>,
        password: &SecretString,
    ) -> Result<TokenResponse, AuthError> {
        // Always run bcrypt, even for unknown principals
        let hash = match &stored {
            Some(credential) => credential.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let valid = self.verify_blocking(password, hash).await?;

        let credential = stored.ok_or(AuthError::InvalidCredentials)?;
        if !valid {
            tracing::info!(
                target: "auth.session",
                subject = %hash_for_correlation(&credential.identity.id.to_string()),
                "Login rejected: password mismatch"
            );
            return Err(AuthError::InvalidCredentials);
        }

        self.token_response(&credential.identity)
    }

    /// Hash a new principal's password and log them straight in.
    ///
    /// Returns the hash to persist together with the token response.
    #[instrument(skip_all, fields(role = %identity.role))]
    pub async fn register(
        &self,
        identity: PrincipalIdentity,
        password: &SecretString,
    ) -> Result<(String, TokenResponse), AuthError> {
        let result = self.register_inner(identity, password).await;
        observe("register", result)
    }

    async fn register_inner(
        &self,
        identity: PrincipalIdentity,
        password: &SecretString,
    ) -> Result<(String, TokenResponse), AuthError> {
        let identity = PrincipalIdentity::new(
            identity.id,
            &identity.email,
            identity.role,
            &identity.display_name,
        );

        if !is_valid_email(&identity.email) {
            return Err(AuthError::InvalidRequest("Invalid email format".to_string()));
        }
        if identity.display_name.is_empty() {
            return Err(AuthError::InvalidRequest(
                "Display name cannot be empty".to_string(),
            ));
        }
        validate_password_policy(password)?;

        let password_hash = self.hash_blocking(password).await?;
        let response = self.token_response(&identity)?;

        tracing::info!(
            target: "auth.session",
            subject = %hash_for_correlation(&identity.id.to_string()),
            role = %identity.role,
            "Principal registered"
        );

        Ok((password_hash, response))
    }

    /// Revoke the token carried in an `Authorization` header.
    ///
    /// The token must pass the verification gateway first, so only the
    /// holder of a genuine token can revoke it. Idempotent: logging out twice
    /// with the same token succeeds both times.
    #[instrument(skip_all)]
    pub fn logout(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let result = self.logout_inner(authorization);
        observe("logout", result)
    }

    fn logout_inner(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(AuthError::MissingBearer)?;

        match self.gateway.authenticate(token) {
            Ok(_) => {}
            // Signature and expiry are checked before the revocation lookup
            Err(AuthError::InvalidToken(RejectReason::Revoked)) => return Ok(()),
            Err(e) => return Err(e),
        }

        let (jti, expires_at) = read_unverified(token)
            .ok_or(AuthError::InvalidToken(RejectReason::Malformed))?;

        self.registry.revoke(&jti, expires_at);
        tracing::info!(
            target: "auth.session",
            token_id = %hash_for_correlation(&jti),
            "Token revoked at logout"
        );
        Ok(())
    }

    /// Verify the current password and hash the replacement.
    ///
    /// Returns the new hash to persist.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        stored_hash: &str,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<String, AuthError> {
        let result = self.change_password_inner(stored_hash, current, new).await;
        observe("change_password", result)
    }

    async fn change_password_inner(
        &self,
        stored_hash: &str,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<String, AuthError> {
        validate_password_policy(new)?;

        if !self.verify_blocking(current, stored_hash.to_string()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        self.hash_blocking(new).await
    }

    fn token_response(&self, identity: &PrincipalIdentity) -> Result<TokenResponse, AuthError> {
        let access_token = self.issuer.issue(identity)?;
        let expires_in = u64::try_from(self.issuer.ttl().num_seconds()).unwrap_or(0);

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in,
            user_id: identity.id,
            role: identity.role,
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        })
    }

    async fn verify_blocking(&self, password: &SecretString, hash: String) -> Result<bool, AuthError> {
        let password = SecretString::from(password.expose_secret().to_owned());

        let valid = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let valid = crypto::verify_password(password.expose_secret(), &hash);
            metrics::record_bcrypt_duration("verify", started.elapsed());
            valid
        })
        .await
        .map_err(|e| {
            tracing::error!(target: "auth.session", error = %e, "Password verification task failed");
            AuthError::Internal
        })?;

        metrics::record_password_verification(if valid { "success" } else { "failure" });
        Ok(valid)
    }

    async fn hash_blocking(&self, password: &SecretString) -> Result<String, AuthError> {
        let password = SecretString::from(password.expose_secret().to_owned());
        let hasher = self.hasher;

        tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let hash = hasher.hash(password.expose_secret());
            metrics::record_bcrypt_duration("hash", started.elapsed());
            hash
        })
        .await
        .map_err(|e| {
            tracing::error!(target: "auth.session", error = %e, "Password hashing task failed");
            AuthError::Internal
        })?
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("issuer", &self.issuer)
            .field("hasher", &self.hasher)
            .field("gateway", &self.gateway)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn observe<T>(flow: &'static str, result: Result<T, AuthError>) -> Result<T, AuthError> {
    let category = result
        .as_ref()
        .err()
        .map(|e| ErrorCategory::from(e).as_str());
    metrics::record_session_operation(flow, category);
    result
}

fn validate_password_policy(password: &SecretString) -> Result<(), AuthError> {
    let password = password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::InvalidRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

/// Basic shape check: `local@domain.tld` with no empty parts.
fn is_valid_email(email: &str) -> bool {
    let email = normalize_email(email);
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    let domain_parts: Vec<&str> = domain.split('.').collect();
    domain_parts.len() >= 2 && domain_parts.iter().all(|p| !p.is_empty())
}
