//! PathFinder Auth Service Library
//!
//! Credential core shared by the learner, organization and administrator
//! flows: password hashing, token issuance, verification and revocation.
//!
//! # Modules
//!
//! - `clock` - Injectable wall-clock source
//! - `config` - Service configuration
//! - `crypto` - Cryptographic operations (JWT signing, password hashing)
//! - `errors` - Error types
//! - `models` - Principal, role and claim models
//! - `observability` - Tracing setup and metrics
//! - `services` - Issuance, verification, revocation and session flows
//! - `tasks` - Background maintenance tasks

pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod observability;
pub mod services;
pub mod tasks;
