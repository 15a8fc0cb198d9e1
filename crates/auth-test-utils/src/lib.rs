//! # Auth Test Utilities
//!
//! Shared test utilities for the PathFinder credential core.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed signing keys, fast-hash config)
//! - A manually driven clock (`ManualClock`)
//! - Token forging (`TestClaimsBuilder`) for hostile-input tests
//! - A wired-up credential stack (`TestCredentialCore`)
//! - Fixed test principals and passwords
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let core = TestCredentialCore::new().unwrap();
//!
//!     let token = core.issuer.issue(&test_learner()).unwrap();
//!     token
//!         .assert_valid_jwt()
//!         .assert_for_subject(TEST_LEARNER_ID)
//!         .assert_has_role("LEARNER");
//!
//!     // Forge a token the gateway must reject
//!     let forged = TestClaimsBuilder::at(core.clock.timestamp())
//!         .without_claim("jti")
//!         .sign(&test_signing_key(1));
//!     assert!(core.gateway.authenticate(&forged).is_err());
//! }
//! ```

pub mod assertions;
pub mod clock;
pub mod crypto_fixtures;
pub mod harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use clock::*;
pub use crypto_fixtures::*;
pub use harness::*;
pub use test_ids::*;
pub use token_builders::*;
