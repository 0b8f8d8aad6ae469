//! Host-side sync controller for embedded worksheets.
//!
//! The controller samples the live document on a fixed timer, compares the
//! sample with the last snapshot the host acknowledged (deep structural
//! equality) and posts it over a [`SnapshotChannel`] only when it changed.
//! A failed post leaves the baseline untouched, so the next tick retries.

pub mod autosave;
pub mod channel;
pub mod controller;
pub mod error;
pub mod indicator;

pub use autosave::{AutosaveHandle, SharedDocument, SnapshotSource, spawn_autosave};
pub use channel::{HostChannel, HttpChannel, MessageSink, SaveAck, SnapshotChannel};
pub use controller::{SyncController, TickOutcome};
pub use error::SyncError;
pub use indicator::{SaveIndicator, SavePhase};

use std::time::Duration;
use util::config;

/// Autosave period from configuration.
pub fn autosave_interval() -> Duration {
    Duration::from_millis(config::autosave_interval_ms())
}

/// How long a save indicator phase stays up, from configuration.
pub fn status_revert_delay() -> Duration {
    Duration::from_millis(config::save_status_revert_ms())
}
