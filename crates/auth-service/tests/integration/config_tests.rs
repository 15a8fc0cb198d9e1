//! Configuration loaded from variables flows through issuance and verification.

use auth_service::config::{Config, ConfigError};
use auth_service::errors::RejectReason;
use auth_test_utils::*;
use std::collections::HashMap;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_configured_identifiers_and_lifetime_reach_tokens() -> Result<(), anyhow::Error> {
    let key = test_signing_key_base64(TEST_KEY_SEED);
    let config = Config::from_vars(&vars(&[
        ("AUTH_JWT_SIGNING_KEY", key.as_str()),
        ("AUTH_JWT_ISSUER", "PathFinderStaging"),
        ("AUTH_JWT_AUDIENCE", "PathFinderStagingUsers"),
        ("AUTH_TOKEN_EXPIRY_MINUTES", "15"),
        ("AUTH_BCRYPT_COST", "10"),
    ]))?;
    let core = TestCredentialCore::with_config(config)?;

    let token = core.issuer.issue(&test_learner())?;
    token
        .assert_issued_for("PathFinderStaging", "PathFinderStagingUsers")
        .assert_lifetime(15 * 60);
    assert!(core.gateway.authenticate(&token).is_ok());
    Ok(())
}

#[test]
fn test_deployments_do_not_accept_each_others_tokens() -> Result<(), anyhow::Error> {
    let key = test_signing_key_base64(TEST_KEY_SEED);
    let staging = TestCredentialCore::with_config(Config::from_vars(&vars(&[
        ("AUTH_JWT_SIGNING_KEY", key.as_str()),
        ("AUTH_JWT_ISSUER", "PathFinderStaging"),
        ("AUTH_BCRYPT_COST", "10"),
    ]))?)?;
    let production = TestCredentialCore::new()?;

    let token = staging.issuer.issue(&test_admin())?;
    assert_eq!(
        production
            .gateway
            .authenticate(&token)
            .unwrap_err()
            .reject_reason(),
        Some(RejectReason::WrongIssuer)
    );
    Ok(())
}

#[test]
fn test_configured_clock_skew_is_honored() -> Result<(), anyhow::Error> {
    let key = test_signing_key_base64(TEST_KEY_SEED);
    let core = TestCredentialCore::with_config(Config::from_vars(&vars(&[
        ("AUTH_JWT_SIGNING_KEY", key.as_str()),
        ("AUTH_JWT_CLOCK_SKEW_SECONDS", "300"),
        ("AUTH_BCRYPT_COST", "10"),
    ]))?)?;

    let token = TestClaimsBuilder::at(core.clock.timestamp())
        .issued_in(240)
        .sign(&core.signing_key());
    assert!(core.gateway.authenticate(&token).is_ok());
    Ok(())
}

#[test]
fn test_short_signing_key_is_fatal() {
    let short = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, [1u8; 16]);
    let err = Config::from_vars(&vars(&[("AUTH_JWT_SIGNING_KEY", short.as_str())])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSigningKey(_)));
}

#[test]
fn test_missing_signing_key_is_fatal() {
    let err = Config::from_vars(&HashMap::new()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(_)));
}
