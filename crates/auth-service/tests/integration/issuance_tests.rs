//! Issue-then-authenticate round trips across every role.

use auth_service::errors::{AuthError, RejectReason};
use auth_service::models::{PrincipalIdentity, Role};
use auth_service::services::read_unverified;
use auth_test_utils::*;
use std::collections::HashSet;

#[test]
fn test_issued_token_authenticates_for_every_role() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;

    for identity in [test_learner(), test_organization(), test_admin()] {
        let token = core.issuer.issue(&identity)?;
        token
            .assert_valid_jwt()
            .assert_for_subject(identity.id)
            .assert_has_role(identity.role.as_str())
            .assert_has_email(&identity.email)
            .assert_issued_for(TEST_ISSUER, TEST_AUDIENCE);

        let principal = core.gateway.authenticate(&token)?;
        assert_eq!(principal.identity, identity);
    }

    Ok(())
}

/// Scenario: {10, a@b.com, LEARNER, "A B"} with a 120 minute lifetime.
#[test]
fn test_learner_scenario_authenticates_with_learner_role() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let identity = PrincipalIdentity::new(10, "a@b.com", Role::Learner, "A B");

    let token = core.issuer.issue(&identity)?;
    token.assert_lifetime(120 * 60).assert_expires_in(120 * 60);

    let principal = core.gateway.authenticate(&token)?;
    assert_eq!(principal.role(), Role::Learner);
    assert_eq!(principal.identity.id, 10);
    assert_eq!(principal.identity.email, "a@b.com");
    assert_eq!(principal.identity.display_name, "A B");
    assert_eq!(principal.token_id, token.token_id());
    assert!(principal.require_role(Role::Learner).is_ok());
    assert!(principal.require_role(Role::Administrator).is_err());

    Ok(())
}

#[test]
fn test_issued_token_ids_are_distinct() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let mut ids = HashSet::new();

    for _ in 0..50 {
        ids.insert(core.issuer.issue(&test_learner())?.token_id());
        ids.insert(core.issuer.issue(&test_organization())?.token_id());
    }

    assert_eq!(ids.len(), 100);
    Ok(())
}

#[test]
fn test_token_reader_matches_issuance() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = core.issuer.issue(&test_admin())?;

    let (jti, expires_at) = read_unverified(&token).expect("issued token is readable");
    let principal = core.gateway.authenticate(&token)?;

    assert_eq!(jti, principal.token_id);
    assert_eq!(expires_at, principal.expires_at);
    assert_eq!(
        expires_at.timestamp(),
        core.clock.timestamp() + core.config.token_ttl.num_seconds()
    );
    Ok(())
}

#[test]
fn test_issue_rejects_invalid_principal_id() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let identity = PrincipalIdentity::new(0, TEST_LEARNER_EMAIL, Role::Learner, "Nobody");

    let err = core.issuer.issue(&identity).unwrap_err();
    assert!(matches!(err, AuthError::InvalidPrincipal(_)));
    Ok(())
}

/// Scenario: a token issued with a lifetime of -1 second is expired, not revoked.
#[test]
fn test_negative_ttl_token_is_expired() -> Result<(), anyhow::Error> {
    let mut config = test_config(TEST_KEY_SEED)?;
    config.token_ttl = chrono::Duration::seconds(-1);
    let core = TestCredentialCore::with_config(config)?;

    let token = core.issuer.issue(&test_learner())?;
    let err = core.gateway.authenticate(&token).unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::Expired));
    assert_eq!(err.to_string(), "The access token is invalid or expired");
    Ok(())
}

#[test]
fn test_token_expires_exactly_at_exp() -> Result<(), anyhow::Error> {
    let mut config = test_config(TEST_KEY_SEED)?;
    config.token_ttl = chrono::Duration::seconds(30);
    let core = TestCredentialCore::with_config(config)?;

    let token = core.issuer.issue(&test_organization())?;

    core.clock.advance_secs(29);
    assert!(core.gateway.authenticate(&token).is_ok());

    core.clock.advance_secs(1);
    assert_eq!(
        core.gateway.authenticate(&token).unwrap_err().reject_reason(),
        Some(RejectReason::Expired)
    );
    Ok(())
}
