//! Common utilities and types shared across PathFinder components.

#![warn(clippy::pedantic)]

/// Module for common configuration
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, clock skew, unverified decoding)
pub mod jwt;
