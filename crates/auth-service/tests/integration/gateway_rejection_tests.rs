//! Every way the verification gateway can say no, and the order it says it in.

use auth_service::clock::Clock;
use auth_service::errors::RejectReason;
use auth_service::models::Role;
use auth_test_utils::*;
use jsonwebtoken::Algorithm;
use serde_json::json;

fn reason(core: &TestCredentialCore, token: &str) -> Option<RejectReason> {
    core.gateway
        .authenticate(token)
        .err()
        .and_then(|e| e.reject_reason())
}

fn builder(core: &TestCredentialCore) -> TestClaimsBuilder {
    TestClaimsBuilder::at(core.clock.timestamp())
}

#[test]
fn test_forged_canonical_token_is_accepted() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core)
        .for_principal(TEST_ORG_ID)
        .with_role("ORGANIZATION")
        .with_email(TEST_ORG_EMAIL)
        .sign(&core.signing_key());

    let principal = core.gateway.authenticate(&token)?;
    assert_eq!(principal.identity.id, TEST_ORG_ID);
    assert_eq!(principal.role(), Role::Organization);
    Ok(())
}

#[test]
fn test_wrong_key_is_bad_signature() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core).sign(&test_signing_key(2));
    assert_eq!(reason(&core, &token), Some(RejectReason::BadSignature));
    Ok(())
}

#[test]
fn test_role_escalation_by_payload_splice_is_bad_signature() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = core.issuer.issue(&test_learner())?;

    let escalated = builder(&core).with_role("ADMINISTRATOR").build();
    let spliced = splice_payload(&token, &escalated);

    assert_eq!(reason(&core, &spliced), Some(RejectReason::BadSignature));
    Ok(())
}

#[test]
fn test_other_algorithms_are_rejected() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    let hs512 = builder(&core).sign_with(Algorithm::HS512, &key);
    assert_eq!(reason(&core, &hs512), Some(RejectReason::BadSignature));

    let unsigned = builder(&core).unsigned();
    assert_eq!(reason(&core, &unsigned), Some(RejectReason::Malformed));
    Ok(())
}

#[test]
fn test_wrong_issuer_and_audience() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    let wrong_issuer = builder(&core).with_issuer("SomeOtherDeployment").sign(&key);
    assert_eq!(reason(&core, &wrong_issuer), Some(RejectReason::WrongIssuer));

    let wrong_audience = builder(&core).with_audience("SomeOtherUsers").sign(&key);
    assert_eq!(reason(&core, &wrong_audience), Some(RejectReason::WrongAudience));
    Ok(())
}

#[test]
fn test_expired_token() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core).expires_in(-1).sign(&core.signing_key());
    assert_eq!(reason(&core, &token), Some(RejectReason::Expired));
    Ok(())
}

#[test]
fn test_expiry_has_no_skew_allowance() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    // Expired by less than the 60 second iat allowance
    let token = builder(&core).expires_in(-10).sign(&core.signing_key());
    assert_eq!(reason(&core, &token), Some(RejectReason::Expired));
    Ok(())
}

#[test]
fn test_issued_in_future_respects_skew() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    let within = builder(&core).issued_in(59).sign(&key);
    assert!(core.gateway.authenticate(&within).is_ok());

    let at_edge = builder(&core).issued_in(60).sign(&key);
    assert!(core.gateway.authenticate(&at_edge).is_ok());

    let beyond = builder(&core).issued_in(61).sign(&key);
    assert_eq!(reason(&core, &beyond), Some(RejectReason::IssuedInFuture));
    Ok(())
}

#[test]
fn test_missing_or_empty_jti() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    let missing = builder(&core).without_claim("jti").sign(&key);
    assert_eq!(reason(&core, &missing), Some(RejectReason::MissingClaim));

    let empty = builder(&core).with_jti("").sign(&key);
    assert_eq!(reason(&core, &empty), Some(RejectReason::MissingClaim));
    Ok(())
}

#[test]
fn test_missing_canonical_claims() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    for claim in ["sub", "email", "role", "name", "iat", "exp", "iss", "aud"] {
        let token = builder(&core).without_claim(claim).sign(&key);
        assert_eq!(
            reason(&core, &token),
            Some(RejectReason::MissingClaim),
            "token without {claim} should be rejected as missing a claim"
        );
    }
    Ok(())
}

#[test]
fn test_fallback_claim_names_are_not_read() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;

    // Role under a non-canonical name only
    let token = builder(&core)
        .without_claim("role")
        .with_claim(
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
            "ADMINISTRATOR",
        )
        .sign(&core.signing_key());

    assert_eq!(reason(&core, &token), Some(RejectReason::MissingClaim));
    Ok(())
}

#[test]
fn test_unknown_role_is_rejected() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core).with_role("SUPERUSER").sign(&core.signing_key());
    assert_eq!(reason(&core, &token), Some(RejectReason::MissingClaim));
    Ok(())
}

#[test]
fn test_structural_garbage_is_malformed() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let oversized = format!(
        "{}.{}.{}",
        "a".repeat(2000),
        "b".repeat(2000),
        "c".repeat(200)
    );

    for token in ["", "garbage", "a.b", "a.b.c", "...", oversized.as_str()] {
        assert_eq!(
            reason(&core, token),
            Some(RejectReason::Malformed),
            "{token:.20} should be malformed"
        );
    }
    Ok(())
}

#[test]
fn test_oversized_signed_token_is_malformed() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core)
        .with_claim("padding", json!("x".repeat(5000)))
        .sign(&core.signing_key());
    assert_eq!(reason(&core, &token), Some(RejectReason::Malformed));
    Ok(())
}

#[test]
fn test_signature_checked_before_expiry() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core).expires_in(-100).sign(&test_signing_key(9));
    assert_eq!(reason(&core, &token), Some(RejectReason::BadSignature));
    Ok(())
}

#[test]
fn test_expiry_checked_before_revocation() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = builder(&core)
        .with_jti("revoked-and-expired")
        .expires_in(5)
        .sign(&core.signing_key());

    let expires_at = core.clock.now() + chrono::Duration::seconds(5);
    core.registry.revoke("revoked-and-expired", expires_at);
    assert_eq!(reason(&core, &token), Some(RejectReason::Revoked));

    core.clock.advance_secs(5);
    assert_eq!(reason(&core, &token), Some(RejectReason::Expired));
    Ok(())
}

#[test]
fn test_every_rejection_has_the_same_message() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let key = core.signing_key();

    let tokens = [
        "garbage".to_string(),
        builder(&core).sign(&test_signing_key(2)),
        builder(&core).with_issuer("x").sign(&key),
        builder(&core).expires_in(-1).sign(&key),
        builder(&core).without_claim("jti").sign(&key),
    ];

    for token in &tokens {
        let err = core.gateway.authenticate(token).unwrap_err();
        assert_eq!(err.to_string(), "The access token is invalid or expired");
        assert!(err.is_unauthenticated());
    }
    Ok(())
}
