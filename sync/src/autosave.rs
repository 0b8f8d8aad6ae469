//! Timer-driven autosave loop.
//!
//! The interval is the only scheduling primitive. Stopping the handle (or
//! dropping it) cancels the timer; a save already in flight is allowed to
//! finish against the host's own atomicity.

use crate::channel::SnapshotChannel;
use crate::controller::{SyncController, TickOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use worksheet::{Snapshot, WorksheetDocument, extract};

/// Somewhere to sample the current snapshot from.
pub trait SnapshotSource: Send + 'static {
    /// `None` skips this tick.
    fn snapshot(&self) -> Option<Snapshot>;
}

pub type SharedDocument = Arc<Mutex<WorksheetDocument>>;

impl SnapshotSource for SharedDocument {
    fn snapshot(&self) -> Option<Snapshot> {
        match self.lock() {
            Ok(doc) => Some(extract(&doc)),
            Err(_) => {
                tracing::error!("worksheet document lock poisoned; skipping autosave tick");
                None
            }
        }
    }
}

pub struct AutosaveHandle<C> {
    token: CancellationToken,
    task: Option<JoinHandle<SyncController<C>>>,
}

impl<C> AutosaveHandle<C> {
    /// Cancels the timer. Does not wait for an in-flight save.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the loop to end (after [`stop`](Self::stop) or a frozen
    /// host) and hands the controller back.
    pub async fn join(mut self) -> Option<SyncController<C>> {
        let task = self.task.take()?;
        match task.await {
            Ok(controller) => Some(controller),
            Err(e) => {
                tracing::error!(error = %e, "autosave task failed");
                None
            }
        }
    }
}

impl<C> Drop for AutosaveHandle<C> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub fn spawn_autosave<C, S>(
    mut controller: SyncController<C>,
    source: S,
    every: Duration,
) -> AutosaveHandle<C>
where
    C: SnapshotChannel + 'static,
    S: SnapshotSource,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the baseline already covers it.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(snapshot) = source.snapshot() else {
                continue;
            };
            if controller.tick(snapshot).await == TickOutcome::Frozen {
                break;
            }
        }
        tracing::debug!("autosave loop ended");
        controller
    });

    AutosaveHandle {
        token,
        task: Some(task),
    }
}
