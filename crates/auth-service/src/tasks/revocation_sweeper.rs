//! Revocation sweeper background task.
//!
//! Periodically prunes revocation entries whose tokens have expired, so the
//! registry stays bounded even when nobody calls `revoke`.
//!
//! # Graceful Shutdown
//!
//! The task exits when its cancellation token is triggered. A sweep already
//! in progress completes first.

use crate::services::revocation_registry::RevocationRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Start the revocation sweeper.
///
/// Runs until `cancel_token` is cancelled. The first sweep happens
/// immediately, then every `interval`.
#[instrument(skip_all, name = "auth.task.revocation_sweeper")]
pub async fn start_revocation_sweeper(
    registry: Arc<RevocationRegistry>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        target: "auth.revocation",
        interval_seconds = interval.as_secs(),
        "Starting revocation sweeper"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                registry.prune_expired();
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "auth.revocation",
                    "Revocation sweeper received shutdown signal, exiting"
                );
                break;
            }
        }
    }

    info!(target: "auth.revocation", "Revocation sweeper stopped");
}
