//! Observability for the auth service
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field allow-listing.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (roles, reject reasons, counts)
//! - **HASHED**: Must be SHA-256 hashed for correlation (principal id, token id)
//! - **NEVER**: Must never appear in logs (passwords, password hashes, tokens, keys)
//!
//! # Log targets
//!
//! - `auth.token` - issuance
//! - `auth.gateway` - verification and role checks
//! - `auth.revocation` - registry and sweeper
//! - `auth.crypto` - hashing and signature primitives
//! - `auth.session` - login, registration and logout flows

pub mod metrics;

use common::config::ObservabilityConfig;
use sha2::{Digest, Sha256};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Returns an error if a
/// subscriber is already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("auth_service={0},auth={0}", config.log_level)));

    let (json_layer, text_layer) = if config.json_logs {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for principal ids and token ids, which need correlation across log
/// entries but should not be stored in plaintext.
///
/// # Privacy
///
/// This is NOT cryptographically secure for secrets - it's a one-way hash
/// for correlation purposes only.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // First 4 bytes = 8 hex chars
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials, missing or rejected bearer tokens
    Authentication,
    /// Role check failures
    Authorization,
    /// Hashing or signing failures
    Cryptographic,
    /// Invalid input and internal faults
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&crate::errors::AuthError> for ErrorCategory {
    fn from(err: &crate::errors::AuthError) -> Self {
        use crate::errors::AuthError;
        match err {
            AuthError::InvalidToken(_)
            | AuthError::MissingBearer
            | AuthError::InvalidCredentials => ErrorCategory::Authentication,
            AuthError::Forbidden { .. } => ErrorCategory::Authorization,
            AuthError::Crypto(_) => ErrorCategory::Cryptographic,
            AuthError::InvalidPrincipal(_)
            | AuthError::InvalidRequest(_)
            | AuthError::Internal => ErrorCategory::Internal,
        }
    }
}
