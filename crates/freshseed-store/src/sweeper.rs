//! Background task that periodically sweeps a [`SeedStore`]

use crate::store::SeedStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Shortest interval the sweeper will run at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the recurring sweep task
///
/// The task stops when [`Sweeper::stop`] is called or the handle is dropped.
pub struct Sweeper {
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Start sweeping `store` every `interval`
    ///
    /// The first pass runs one full interval after spawning. Intervals below
    /// [`MIN_SWEEP_INTERVAL`] are raised to it.
    pub fn spawn(store: Arc<SeedStore>, interval: Duration) -> Self {
        let interval = if interval < MIN_SWEEP_INTERVAL {
            warn!(
                "Sweep interval {:?} too short, using {:?}",
                interval, MIN_SWEEP_INTERVAL
            );
            MIN_SWEEP_INTERVAL
        } else {
            interval
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let report = store.sweep().await;
                if report.marked > 0 || report.evicted > 0 {
                    info!(
                        "Sweep: {} marked expired, {} evicted, {} remaining",
                        report.marked, report.evicted, report.remaining
                    );
                } else {
                    debug!("Sweep: nothing to do ({} records)", report.remaining);
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Stop the sweep task; safe to call more than once
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Sweeper stopped");
        }
    }

    /// Whether the sweep task is still scheduled
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
