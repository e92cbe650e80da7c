//! Expiry sweeper
//!
//! Background task that periodically removes expired pings from a
//! `PingStore`. Each sweep runs in its own task so a panic during one cycle
//! is logged and the schedule carries on.

use super::{now_millis, PingStore};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Periodic purge of expired pings
pub struct Sweeper {
    store: PingStore,
    interval: Duration,
    /// Number of upcoming cycles that panic instead of sweeping
    #[cfg(test)]
    failing_cycles: Arc<AtomicUsize>,
}

impl Sweeper {
    /// Create a sweeper for `store` running every `interval`
    pub fn new(store: PingStore, interval: Duration) -> Self {
        Self {
            store,
            interval,
            #[cfg(test)]
            failing_cycles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Run until `cancel` fires
    ///
    /// The first sweep happens one full interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Expiry sweeper started, interval: {:?}", self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Expiry sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Run a single sweep, isolating any panic to this cycle
    ///
    /// Returns the number of pings removed, or None if the sweep failed.
    pub async fn sweep_once(&self) -> Option<usize> {
        let store = self.store.clone();
        #[cfg(test)]
        let fail = self
            .failing_cycles
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        let task = tokio::spawn(async move {
            #[cfg(test)]
            if fail {
                panic!("sweep cycle failed");
            }
            store.sweep_expired(now_millis()).await
        });

        match task.await {
            Ok(removed) => {
                if removed > 0 {
                    debug!("Swept {} expired pings", removed);
                }
                Some(removed)
            }
            Err(e) => {
                error!("Expiry sweep failed: {}", e);
                None
            }
        }
    }

    /// Spawn the sweeper as a background task
    pub fn spawn(store: PingStore, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(Self::new(store, interval).run(cancel))
    }
}
