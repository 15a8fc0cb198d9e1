use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::{AuthError, RejectReason};
use crate::models::Claims;
use common::jwt::MAX_JWT_SIZE_BYTES;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::instrument;

/// Generate a fresh, unpredictable token identifier (UUIDv4, 122 random bits).
pub fn generate_token_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sign claims with HS256 using the shared key.
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, signing_key: &[u8]) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(signing_key);

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &encoding_key)
        .map_err(|e| AuthError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an HS256 JWT and extract the canonical claims.
///
/// Validates:
/// - Token size (must be <= MAX_JWT_SIZE_BYTES), checked before any parsing
/// - Header structure and algorithm (HS256 only)
/// - Signature
/// - Presence of `exp`, `iss`, `aud` and `sub`
/// - `iss` and `aud` against the expected identifiers
///
/// Expiry and `iat` are deliberately NOT checked here; the gateway checks
/// them against its injected clock so that expiry and revocation pruning
/// share one notion of "now".
#[instrument(skip_all)]
pub fn verify_jwt(
    token: &str,
    signing_key: &[u8],
    issuer: &str,
    audience: &str,
) -> Result<Claims, RejectReason> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "auth.crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(RejectReason::Malformed);
    }

    // Header problems are structural or algorithm-level, never claim-level
    let header = decode_header(token).map_err(|e| {
        tracing::debug!(target: "auth.crypto", error = %e, "Failed to parse JWT header");
        RejectReason::Malformed
    })?;
    if header.alg != Algorithm::HS256 {
        tracing::debug!(
            target: "auth.crypto",
            alg = ?header.alg,
            "Token rejected: unexpected algorithm"
        );
        return Err(RejectReason::BadSignature);
    }

    let decoding_key = DecodingKey::from_secret(signing_key);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        let reason = classify_jwt_error(e.kind());
        tracing::debug!(
            target: "auth.crypto",
            error = %e,
            reason = %reason,
            "Token verification failed"
        );
        reason
    })?;

    Ok(token_data.claims)
}

fn classify_jwt_error(kind: &ErrorKind) -> RejectReason {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => RejectReason::BadSignature,
        ErrorKind::InvalidIssuer => RejectReason::WrongIssuer,
        ErrorKind::InvalidAudience => RejectReason::WrongAudience,
        ErrorKind::ExpiredSignature => RejectReason::Expired,
        // Header already parsed, so JSON errors here come from the claim set
        ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => RejectReason::MissingClaim,
        _ => RejectReason::Malformed,
    }
}

/// Longest password bcrypt hashes in full; longer input is refused.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with bcrypt using the given cost factor.
///
/// A fresh 128-bit salt is drawn from the OS for every call.
///
/// # Errors
///
/// Returns `AuthError::Crypto` if:
/// - Cost is outside the valid range (10-14)
/// - The password is longer than `MAX_PASSWORD_BYTES`
/// - The OS entropy source fails. This is never retried with weaker input.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Crypto(format!(
            "Password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!(target: "auth.crypto", error = %e, "Password hashing failed");
        AuthError::Crypto(format!("Password hashing failed: {}", e))
    })
}

/// Verify a password against a bcrypt hash.
///
/// Malformed hashes verify as `false` instead of raising, as do passwords
/// longer than `MAX_PASSWORD_BYTES`.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        tracing::debug!(target: "auth.crypto", "Password exceeds bcrypt input limit");
        return false;
    }

    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!(target: "auth.crypto", error = %e, "Password hash could not be parsed");
            false
        }
    }
}

/// Credential hasher bound to a configured work factor.
///
/// Stateless and lock-free; share freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AuthError::Crypto(format!(
                "Invalid bcrypt cost: {} (must be {}-{})",
                cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_password(password, self.cost)
    }

    pub fn verify(&self, password: &str, hash: &str) -> bool {
        verify_password(password, hash)
    }
}
