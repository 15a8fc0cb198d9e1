//! Fixed test principals for deterministic tests
//!
//! Using fixed ids and emails prevents flaky tests caused by random data.

use auth_service::models::{PrincipalIdentity, Role};

// Administrator IDs (1-99)
pub const TEST_ADMIN_ID: i64 = 1;

// Learner IDs (100-199)
pub const TEST_LEARNER_ID: i64 = 100;
pub const TEST_LEARNER_2_ID: i64 = 101;

// Organization IDs (1000-1099)
pub const TEST_ORG_ID: i64 = 1000;

// Emails
pub const TEST_ADMIN_EMAIL: &str = "admin@pathfinder.com";
pub const TEST_LEARNER_EMAIL: &str = "student@pathfinder.com";
pub const TEST_ORG_EMAIL: &str = "company@pathfinder.com";

// Passwords (all satisfy the minimum length policy)
pub const TEST_ADMIN_PASSWORD: &str = "Admin@123";
pub const TEST_LEARNER_PASSWORD: &str = "Student@Pass123";
pub const TEST_ORG_PASSWORD: &str = "Company@Secure456";
pub const TEST_WRONG_PASSWORD: &str = "WrongPass@999";

// Deployment identifiers
pub const TEST_ISSUER: &str = "PathFinder";
pub const TEST_AUDIENCE: &str = "PathFinderUsers";

pub fn test_admin() -> PrincipalIdentity {
    PrincipalIdentity::new(TEST_ADMIN_ID, TEST_ADMIN_EMAIL, Role::Administrator, "System Admin")
}

pub fn test_learner() -> PrincipalIdentity {
    PrincipalIdentity::new(TEST_LEARNER_ID, TEST_LEARNER_EMAIL, Role::Learner, "Test Student")
}

pub fn test_organization() -> PrincipalIdentity {
    PrincipalIdentity::new(TEST_ORG_ID, TEST_ORG_EMAIL, Role::Organization, "Acme Hiring")
}
