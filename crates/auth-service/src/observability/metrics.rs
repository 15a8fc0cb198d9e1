//! Metrics definitions for the auth service
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `role`: 3 values (LEARNER, ORGANIZATION, ADMINISTRATOR)
//! - `status`: 2 values (success, error)
//! - `reason`: 9 values (the gateway reject reasons plus `none`)
//! - `operation`: bounded by code (hash, verify)
//! - `flow`: bounded by code (login, register, logout, change_password)
//! - `error_category`: 4 values

use crate::errors::RejectReason;
use crate::models::Role;
use metrics::{counter, gauge, histogram};
use std::time::Duration;

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance outcome
///
/// Metric: `auth_token_issuance_total`
/// Labels: `role`, `status`
pub fn record_token_issuance(role: Role, status: &str) {
    counter!("auth_token_issuance_total", "role" => role.as_str(), "status" => status.to_string())
        .increment(1);
}

/// Record a gateway decision
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(reason: Option<RejectReason>) {
    let (status, reason) = match reason {
        Some(reason) => ("error", reason.as_str()),
        None => ("success", "none"),
    };
    counter!("auth_token_validations_total", "status" => status, "reason" => reason).increment(1);
}

// ============================================================================
// Revocation Metrics
// ============================================================================

/// Metric: `auth_revocations_total`
pub fn record_revocation() {
    counter!("auth_revocations_total").increment(1);
}

/// Record entries removed by a sweep
///
/// Metric: `auth_revocation_pruned_total`
pub fn record_revocation_pruned(count: usize) {
    counter!("auth_revocation_pruned_total").increment(count as u64);
}

/// Metric: `auth_revocation_entries`
#[allow(clippy::cast_precision_loss)]
pub fn set_revocation_entries(count: usize) {
    gauge!("auth_revocation_entries").set(count as f64);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record password verification outcome
///
/// Metric: `auth_password_verifications_total`
/// Labels: `status`
pub fn record_password_verification(status: &str) {
    counter!("auth_password_verifications_total", "status" => status.to_string()).increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `auth_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &'static str, duration: Duration) {
    histogram!("auth_bcrypt_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

// ============================================================================
// Session Metrics
// ============================================================================

/// Record a session flow outcome
///
/// Metric: `auth_session_operations_total`
/// Labels: `flow`, `status`, `error_category`
pub fn record_session_operation(flow: &'static str, error_category: Option<&'static str>) {
    let status = if error_category.is_some() { "error" } else { "success" };
    counter!(
        "auth_session_operations_total",
        "flow" => flow,
        "status" => status,
        "error_category" => error_category.unwrap_or("none")
    )
    .increment(1);
}
