//! Manually driven clock for expiry and revocation tests.

use auth_service::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// A [`Clock`] that only moves when told to.
///
/// # Example
/// ```rust,ignore
/// let clock = Arc::new(ManualClock::at_timestamp(1_700_000_000));
/// let registry = RevocationRegistry::new(clock.clone(), Duration::from_secs(60));
/// registry.revoke("jti", clock.now() + chrono::Duration::seconds(10));
/// clock.advance(chrono::Duration::seconds(10));
/// assert!(!registry.is_revoked("jti"));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock pinned to a unix timestamp (whole seconds).
    pub fn at_timestamp(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).expect("timestamp in range"))
    }

    /// Clock pinned to the current wall time, truncated to whole seconds so
    /// it agrees exactly with JWT `iat`/`exp` values.
    pub fn starting_now() -> Self {
        Self::at_timestamp(Utc::now().timestamp())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }

    /// Current time as unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
