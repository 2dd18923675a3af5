//! Background sweep of expired access tokens.
//!
//! Pure garbage collection: redemption already refuses expired tokens, the sweep only
//! bounds table growth from tokens that were issued and never redeemed.
//!
//! One task, one bulk delete per tick, ticks never overlap. Store errors are logged and
//! the next attempt happens on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::StoreError;
use crate::store::LicenseStore;

/// Default period between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to the running sweep task.
pub struct TokenSweeper {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TokenSweeper {
    /// Spawn the sweep loop. The first sweep runs one full `period` after start.
    pub fn spawn(store: Arc<dyn LicenseStore>, period: Duration) -> Self {
        let (shutdown, signal) = watch::channel(false);
        let task = tokio::spawn(run(store, period, signal));
        Self { shutdown, task }
    }

    /// Signal the loop to stop and wait for it to finish.
    ///
    /// The signal is observed between ticks; a sweep already in flight completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "token sweeper task failed");
        }
    }
}

async fn run(store: Arc<dyn LicenseStore>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_secs = period.as_secs(), "token sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = sweep_once(store.as_ref()).await {
                    tracing::error!(error = %e, "error cleaning up expired tokens");
                }
            }
            changed = shutdown.changed() => {
                // A dropped sender also means the owner is gone
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("token sweeper stopped");
}

/// Delete every expired token once. Returns the number of rows removed.
pub async fn sweep_once(store: &dyn LicenseStore) -> Result<u64, StoreError> {
    let removed = store.delete_expired_tokens().await?;
    if removed > 0 {
        tracing::debug!(removed, "expired access tokens swept");
    }
    Ok(removed)
}
