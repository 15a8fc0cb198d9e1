//! In-memory registry of revoked token ids.
//!
//! Entries live only until the token they block would have expired anyway, so
//! the registry stays bounded by the number of live revoked tokens.

use crate::clock::Clock;
use crate::observability::{hash_for_correlation, metrics};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Process-wide set of revoked `jti` values with their expiry.
///
/// Backed by a lock-sharded map; every method takes `&self` and is safe to
/// call from any number of threads. No operation fails.
pub struct RevocationRegistry {
    entries: DashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    sweep_interval_secs: i64,
    /// Unix seconds of the last inline sweep. Used to elect one sweeper.
    last_sweep: AtomicI64,
}

impl RevocationRegistry {
    pub fn new(clock: Arc<dyn Clock>, sweep_interval: Duration) -> Self {
        let last_sweep = AtomicI64::new(clock.now().timestamp());
        Self {
            entries: DashMap::new(),
            clock,
            sweep_interval_secs: i64::try_from(sweep_interval.as_secs()).unwrap_or(i64::MAX),
            last_sweep,
        }
    }

    /// Revoke `jti` until `expires_at`.
    ///
    /// Idempotent. A second revoke of the same id keeps the later expiry.
    /// Revoking an already-expired token records nothing.
    pub fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) {
        let now = self.clock.now();

        if expires_at <= now {
            tracing::debug!(
                target: "auth.revocation",
                token_id = %hash_for_correlation(jti),
                "Token already expired, nothing to revoke"
            );
        } else {
            self.entries
                .entry(jti.to_string())
                .and_modify(|existing| {
                    if expires_at > *existing {
                        *existing = expires_at;
                    }
                })
                .or_insert(expires_at);

            metrics::record_revocation();
            tracing::info!(
                target: "auth.revocation",
                token_id = %hash_for_correlation(jti),
                expires_at = %expires_at,
                "Token revoked"
            );
        }

        self.maybe_sweep(now);
        metrics::set_revocation_entries(self.entries.len());
    }

    /// True iff `jti` is revoked and its entry has not yet expired.
    ///
    /// An expired entry found here is removed on the way out.
    pub fn is_revoked(&self, jti: &str) -> bool {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(jti) {
            if *entry > now {
                return true;
            }
            // Release the shard read lock before removing
            drop(entry);
            self.entries.remove_if(jti, |_, expires_at| *expires_at <= now);
        }

        false
    }

    /// Remove every entry whose expiry is at or before now.
    ///
    /// Returns the number of entries removed. Concurrent lookups only ever
    /// wait on the shard currently being swept.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;

        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            metrics::record_revocation_pruned(removed);
            tracing::debug!(
                target: "auth.revocation",
                removed = removed,
                remaining = self.entries.len(),
                "Pruned expired revocations"
            );
        }
        metrics::set_revocation_entries(self.entries.len());

        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inline sweep when the interval has elapsed. Only the caller that wins
    /// the compare-exchange sweeps; everyone else returns immediately.
    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let now_secs = now.timestamp();
        let last = self.last_sweep.load(Ordering::Acquire);

        if now_secs.saturating_sub(last) < self.sweep_interval_secs {
            return;
        }

        if self
            .last_sweep
            .compare_exchange(last, now_secs, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.prune_expired();
        }
    }
}

impl std::fmt::Debug for RevocationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationRegistry")
            .field("entries", &self.entries.len())
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish_non_exhaustive()
    }
}
