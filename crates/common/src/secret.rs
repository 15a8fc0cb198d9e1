//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types for
//! plaintext passwords, bearer tokens and signing key material.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct that derives `Debug` while holding a secret stays safe to log via
//! `{:?}` or `tracing`. Secrets are zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginAttempt {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let attempt = LoginAttempt {
//!     email: "learner@pathfinder.com".to_string(),
//!     password: SecretString::from("Student@Pass123"),
//! };
//!
//! // Password is redacted in debug output
//! let rendered = format!("{attempt:?}");
//! assert!(!rendered.contains("Student@Pass123"));
//!
//! // Access requires an explicit call
//! let password: &str = attempt.password.expose_secret();
//! assert_eq!(password, "Student@Pass123");
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - Plaintext passwords on their way to the hasher
//! - Bearer tokens held outside the request path
//!
//! Use `SecretBox<Vec<u8>>` for:
//! - HMAC signing keys

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
