//! User-visible save status.
//!
//! `Saving`, `Saved` and `Error` are transient: each reverts to `Idle` after a
//! fixed delay. Every change bumps a generation counter and a pending revert
//! only fires if no newer phase was set in the meantime.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePhase {
    Idle,
    Saving,
    Saved,
    Error,
}

#[derive(Clone)]
pub struct SaveIndicator {
    tx: Arc<watch::Sender<SavePhase>>,
    generation: Arc<AtomicU64>,
    revert_after: Duration,
}

impl SaveIndicator {
    pub fn new(revert_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(SavePhase::Idle);
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            revert_after,
        }
    }

    pub fn phase(&self) -> SavePhase {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SavePhase> {
        self.tx.subscribe()
    }

    pub fn set(&self, phase: SavePhase) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(phase);

        if phase == SavePhase::Idle {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let tx = Arc::clone(&self.tx);
        let current = Arc::clone(&self.generation);
        let delay = self.revert_after;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                tx.send_replace(SavePhase::Idle);
            }
        });
    }
}

impl std::fmt::Debug for SaveIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveIndicator")
            .field("phase", &self.phase())
            .field("revert_after", &self.revert_after)
            .finish()
    }
}
