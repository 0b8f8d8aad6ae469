//! Worksheet document model and the state-sync protocol pieces that live on the
//! worksheet side of the isolation boundary.
//!
//! - [`document`]: the live document parsed from author markup.
//! - [`tasks`]: one handler per interactive task kind, looked up by id prefix.
//! - [`snapshot`]: the serializable interaction state.
//! - [`extractor`]: `extract` / `load` between the two.
//! - [`boundary`]: the message format and host-side validation of untrusted messages.
//! - [`embed`]: builds the sandboxed `srcdoc` with the injected bootstrap.
//! - [`session`]: what the embedded page does on load.

pub mod boundary;
pub mod document;
pub mod embed;
pub mod error;
pub mod extractor;
pub mod session;
pub mod snapshot;
pub mod tasks;

pub use document::{Action, Phase, WorksheetDocument};
pub use embed::{Embed, EmbedBuilder, SANDBOX_POLICY, ViewMode};
pub use error::{BoundaryError, InteractionError, TaskError};
pub use extractor::{LoadReport, extract, load};
pub use snapshot::{EngagementMetrics, Snapshot, TaskState};
pub use tasks::{Feedback, Task, TaskRegistry};
