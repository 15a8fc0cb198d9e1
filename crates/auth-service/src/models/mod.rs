use crate::errors::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of principal kinds. Each token carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Learner,
    Organization,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "LEARNER",
            Role::Organization => "ORGANIZATION",
            Role::Administrator => "ADMINISTRATOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEARNER" => Ok(Role::Learner),
            "ORGANIZATION" => Ok(Role::Organization),
            "ADMINISTRATOR" => Ok(Role::Administrator),
            other => Err(AuthError::InvalidPrincipal(format!("Unknown role: {other}"))),
        }
    }
}

/// Identity of a principal as supplied by the persistence layer.
///
/// Never stored by this crate; only read at issuance time.
#[derive(Clone, PartialEq, Eq)]
pub struct PrincipalIdentity {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

impl PrincipalIdentity {
    /// Build an identity with a trimmed, lowercased email and trimmed name.
    pub fn new(id: i64, email: &str, role: Role, display_name: &str) -> Self {
        Self {
            id,
            email: normalize_email(email),
            role,
            display_name: display_name.trim().to_string(),
        }
    }
}

/// Redacts email and name.
impl fmt::Debug for PrincipalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalIdentity")
            .field("id", &self.id)
            .field("email", &"[REDACTED]")
            .field("role", &self.role)
            .field("display_name", &"[REDACTED]")
            .finish()
    }
}

/// Lowercase and trim an email so `A@x.com` and `a@x.com ` are one account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Principal record plus its stored password hash, as loaded by the caller.
#[derive(Clone)]
pub struct StoredCredential {
    pub identity: PrincipalIdentity,
    pub password_hash: String,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("identity", &self.identity)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Canonical claim set. The issuer writes exactly these names and the
/// gateway reads exactly these names.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id, decimal string)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Display name
    pub name: String,
    /// Unique token identifier for revocation. Optional on the wire so the
    /// gateway can report a missing id distinctly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Custom Debug implementation that redacts `sub`, `email`, `name` and `jti`.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("email", &"[REDACTED]")
            .field("role", &self.role)
            .field("name", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .finish()
    }
}

/// A principal whose credential passed every gateway check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub identity: PrincipalIdentity,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedPrincipal {
    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Coarse-grained authorization on the role claim.
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        self.require_any_role(&[required])
    }

    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.identity.role) {
            return Ok(());
        }

        tracing::debug!(
            target: "auth.gateway",
            provided = %self.identity.role,
            "Role check failed"
        );
        Err(AuthError::Forbidden {
            required: allowed.to_vec(),
            provided: self.identity.role,
        })
    }
}

/// Response handed back after login or registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry, zero when already expired
    pub expires_in: u64,
    pub user_id: i64,
    pub role: Role,
    pub email: String,
    pub display_name: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
