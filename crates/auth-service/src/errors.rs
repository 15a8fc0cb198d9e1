use crate::models::Role;
use std::fmt;
use thiserror::Error;

/// Why the verification gateway rejected a credential.
///
/// Reasons are for logs and metrics only. Callers see a single generic
/// "unauthenticated" message whatever the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Not a structurally valid token (segments, base64, JSON, size)
    Malformed,
    /// Signature does not match the shared key, or unexpected algorithm
    BadSignature,
    WrongIssuer,
    WrongAudience,
    /// `exp` is at or before the verifier's clock
    Expired,
    /// `iat` is further in the future than the clock skew allowance
    IssuedInFuture,
    /// A canonical claim is absent or empty
    MissingClaim,
    /// Token id is in the revocation registry
    Revoked,
}

impl RejectReason {
    /// Bounded label value for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Malformed => "malformed",
            RejectReason::BadSignature => "bad_signature",
            RejectReason::WrongIssuer => "wrong_issuer",
            RejectReason::WrongAudience => "wrong_audience",
            RejectReason::Expired => "expired",
            RejectReason::IssuedInFuture => "issued_in_future",
            RejectReason::MissingClaim => "missing_claim",
            RejectReason::Revoked => "revoked",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("The access token is invalid or expired")]
    InvalidToken(RejectReason),

    #[error("Authorization token missing")]
    MissingBearer,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient role: required one of {required:?}, provided {provided}")]
    Forbidden { required: Vec<Role>, provided: Role },

    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// The specific gateway rejection, if this is one.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            AuthError::InvalidToken(reason) => Some(*reason),
            _ => None,
        }
    }

    /// True for every failure that must surface as "unauthenticated".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken(_) | AuthError::MissingBearer | AuthError::InvalidCredentials
        )
    }
}
