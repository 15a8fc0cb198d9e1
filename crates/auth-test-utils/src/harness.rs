//! Wired-up credential stack for integration tests
//!
//! Provides `TestCredentialCore`: issuer, gateway, registry and session
//! service sharing one `ManualClock` and one signing key.

use crate::clock::ManualClock;
use crate::crypto_fixtures::{test_config, FixtureError};
use auth_service::clock::Clock;
use auth_service::config::Config;
use auth_service::crypto::CredentialHasher;
use auth_service::services::{RevocationRegistry, SessionService, TokenIssuer, VerificationGateway};
use common::secret::ExposeSecret;
use std::sync::Arc;

/// Seed of the key every `TestCredentialCore` signs with by default.
pub const TEST_KEY_SEED: u8 = 1;

/// Test harness holding every credential component
///
/// # Example
/// ```rust,ignore
/// let core = TestCredentialCore::new()?;
/// let token = core.issuer.issue(&test_learner())?;
/// core.clock.advance_secs(7200);
/// assert!(core.gateway.authenticate(&token).is_err());
/// ```
pub struct TestCredentialCore {
    pub config: Config,
    pub clock: Arc<ManualClock>,
    pub hasher: CredentialHasher,
    pub registry: Arc<RevocationRegistry>,
    pub issuer: Arc<TokenIssuer>,
    pub gateway: Arc<VerificationGateway>,
    pub session: SessionService,
}

impl TestCredentialCore {
    /// Stack built from `test_config(TEST_KEY_SEED)` with the clock pinned
    /// to the current wall time.
    pub fn new() -> Result<Self, FixtureError> {
        Self::with_config(test_config(TEST_KEY_SEED)?)
    }

    pub fn with_config(config: Config) -> Result<Self, FixtureError> {
        let clock = Arc::new(ManualClock::starting_now());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let registry = Arc::new(RevocationRegistry::new(
            dyn_clock.clone(),
            config.revocation_sweep_interval,
        ));
        let issuer = Arc::new(TokenIssuer::new(&config, dyn_clock.clone()));
        let gateway = Arc::new(VerificationGateway::new(&config, registry.clone(), dyn_clock));
        let hasher = CredentialHasher::new(config.bcrypt_cost)
            .map_err(|e| FixtureError::Service(e.to_string()))?;
        let session = SessionService::new(issuer.clone(), hasher, gateway.clone(), registry.clone())
            .map_err(|e| FixtureError::Service(e.to_string()))?;

        Ok(Self {
            config,
            clock,
            hasher,
            registry,
            issuer,
            gateway,
            session,
        })
    }

    /// The raw signing key, for forging tokens the gateway should accept.
    pub fn signing_key(&self) -> Vec<u8> {
        self.config.signing_key.expose_secret().clone()
    }
}
