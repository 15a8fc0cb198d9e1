//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible HS256 signing keys and test configuration.
//! All fixtures are deterministic based on seed values.

use auth_service::config::{Config, ConfigError, MIN_BCRYPT_COST};
use base64::engine::general_purpose;
use base64::Engine;
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Service construction failed: {0}")]
    Service(String),
}

/// Generate a deterministic 32-byte HS256 signing key for testing.
///
/// The same seed always produces the same key, ensuring test reproducibility.
/// Different seeds produce different keys, so `test_signing_key(2)` is a
/// convenient "wrong key" for signature tests.
///
/// # Example
/// ```rust,ignore
/// let key = test_signing_key(1);
/// assert_eq!(key, test_signing_key(1));
/// assert_ne!(key, test_signing_key(2));
/// ```
pub fn test_signing_key(seed: u8) -> Vec<u8> {
    let mut key = vec![0u8; 32];
    key[0] = seed;
    for (i, byte) in key.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }
    key
}

/// Standard-base64 form of [`test_signing_key`], as `AUTH_JWT_SIGNING_KEY` expects.
pub fn test_signing_key_base64(seed: u8) -> String {
    general_purpose::STANDARD.encode(test_signing_key(seed))
}

/// Config built around `test_signing_key(seed)` with the cheapest allowed
/// bcrypt cost, so hashing tests stay fast.
pub fn test_config(seed: u8) -> Result<Config, FixtureError> {
    let mut config = Config::for_signing_key(test_signing_key(seed))?;
    config.bcrypt_cost = MIN_BCRYPT_COST;
    Ok(config)
}
