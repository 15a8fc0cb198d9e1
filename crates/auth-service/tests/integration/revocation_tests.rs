//! Revocation through the full stack: logout, lapse, and concurrent access.

use auth_service::clock::Clock;
use auth_service::errors::RejectReason;
use auth_service::services::read_unverified;
use auth_test_utils::*;
use std::sync::Arc;

#[test]
fn test_revoked_token_is_rejected_as_revoked() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = core.issuer.issue(&test_learner())?;
    assert!(core.gateway.authenticate(&token).is_ok());

    let (jti, expires_at) = read_unverified(&token).expect("issued token is readable");
    core.registry.revoke(&jti, expires_at);

    let err = core.gateway.authenticate(&token).unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::Revoked));
    Ok(())
}

#[test]
fn test_revocation_holds_until_expiry() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let token = core.issuer.issue(&test_organization())?;
    let (jti, expires_at) = read_unverified(&token).expect("issued token is readable");
    core.registry.revoke(&jti, expires_at);

    let lifetime = core.config.token_ttl.num_seconds();
    for offset in [1, lifetime / 2, lifetime - 1] {
        core.clock.set(expires_at - chrono::Duration::seconds(lifetime - offset));
        assert_eq!(
            core.gateway.authenticate(&token).unwrap_err().reject_reason(),
            Some(RejectReason::Revoked),
            "token should stay revoked {offset}s into its lifetime"
        );
    }

    core.clock.set(expires_at);
    assert_eq!(
        core.gateway.authenticate(&token).unwrap_err().reject_reason(),
        Some(RejectReason::Expired)
    );
    assert!(!core.registry.is_revoked(&jti));
    Ok(())
}

#[test]
fn test_revoking_one_token_leaves_siblings_valid() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let first = core.issuer.issue(&test_learner())?;
    let second = core.issuer.issue(&test_learner())?;

    let (jti, expires_at) = read_unverified(&first).expect("issued token is readable");
    core.registry.revoke(&jti, expires_at);

    assert!(core.gateway.authenticate(&first).is_err());
    assert!(core.gateway.authenticate(&second).is_ok());
    Ok(())
}

#[test]
fn test_revoking_past_expiry_is_not_observable() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let past = core.clock.now() - chrono::Duration::seconds(1);

    core.registry.revoke("already-gone", past);
    assert!(!core.registry.is_revoked("already-gone"));
    assert!(core.registry.is_empty());
    Ok(())
}

#[test]
fn test_registry_stays_bounded_across_cycles() -> Result<(), anyhow::Error> {
    let core = TestCredentialCore::new()?;
    let sweep = i64::try_from(core.config.revocation_sweep_interval.as_secs())?;

    for cycle in 0..20 {
        for i in 0..50 {
            let expires_at = core.clock.now() + chrono::Duration::seconds(10);
            core.registry.revoke(&format!("cycle{cycle}-{i}"), expires_at);
        }
        core.clock.advance_secs(sweep);
    }

    // Only the final cycle can still be live; earlier ones were swept inline
    assert!(core.registry.len() <= 50, "registry grew to {}", core.registry.len());
    core.registry.prune_expired();
    assert!(core.registry.is_empty());
    Ok(())
}

#[test]
fn test_concurrent_revoke_and_authenticate() -> Result<(), anyhow::Error> {
    let core = Arc::new(TestCredentialCore::new()?);

    let tokens: Vec<String> = (0..64)
        .map(|_| core.issuer.issue(&test_learner()))
        .collect::<Result<_, _>>()?;

    std::thread::scope(|scope| {
        for chunk in tokens.chunks(16) {
            let core = &core;
            scope.spawn(move || {
                for token in chunk {
                    let (jti, expires_at) = read_unverified(token).expect("readable");
                    assert!(core.gateway.authenticate(token).is_ok());
                    core.registry.revoke(&jti, expires_at);
                    assert_eq!(
                        core.gateway.authenticate(token).unwrap_err().reject_reason(),
                        Some(RejectReason::Revoked)
                    );
                }
            });
        }
        for _ in 0..4 {
            let core = &core;
            scope.spawn(move || {
                for _ in 0..100 {
                    core.registry.prune_expired();
                }
            });
        }
    });

    assert_eq!(core.registry.len(), 64);
    Ok(())
}
