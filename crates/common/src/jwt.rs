//! JWT utilities shared across PathFinder components.
//!
//! This module provides:
//! - Size limits for DoS prevention
//! - Clock skew constants for `iat` validation
//! - Unverified payload decoding (used only for self-service logout)
//! - `iat` validation logic
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Unverified decoding never establishes trust; callers must only use it on
//!   tokens that were already authenticated or whose contents are harmless
//! - Error messages are generic to prevent information leakage

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (4KB).
///
/// A credential carrying identity, role and display name is typically
/// 350-450 bytes with an HS256 signature. Anything larger than this limit is
/// rejected before base64 decoding or HMAC computation.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Default clock skew tolerance between issuer and verifier (1 minute).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Maximum allowed clock skew tolerance (10 minutes).
///
/// Prevents misconfiguration from weakening `iat` validation.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during low-level JWT handling.
///
/// Every variant renders the same message. Details go to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Functions
// =============================================================================

/// Decode the claim set (middle segment) of a JWT without verifying the signature.
///
/// # Security
///
/// - Token size is checked BEFORE any parsing
/// - The signature is NOT checked; the returned claims are untrusted
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong segment count, bad base64, or a payload that is
///   not a JSON object
pub fn decode_payload_unverified(token: &str) -> Result<serde_json::Value, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let payload_part = parts.get(1).ok_or(JwtValidationError::MalformedToken)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT payload base64");
        JwtValidationError::MalformedToken
    })?;

    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT payload JSON");
        JwtValidationError::MalformedToken
    })?;

    if !payload.is_object() {
        return Err(JwtValidationError::MalformedToken);
    }

    Ok(payload)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` when `iat` exceeds
/// `now + clock_skew`.
pub fn validate_iat_at(iat: i64, clock_skew: Duration, now: i64) -> Result<(), JwtValidationError> {
    // clock_skew is bounded by MAX_CLOCK_SKEW at config time
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now.saturating_add(clock_skew_secs);

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
