//! Background tasks for the auth service.
//!
//! # Tasks
//!
//! - `revocation_sweeper` - Prunes expired entries from the revocation registry

pub mod revocation_sweeper;

pub use revocation_sweeper::start_revocation_sweeper;
