//! Interactive task kinds.
//!
//! Each kind implements [`Task`]. Handlers are selected by task-id prefix
//! through the [`TaskRegistry`], so adding a kind means writing one module and
//! registering one builder.

pub mod drag_drop;
pub mod fill_blank;
pub mod match_pairs;
pub mod registry;
pub mod single_choice;

pub use registry::{TaskBuilder, TaskRegistry};

use crate::document::Action;
use crate::error::{InteractionError, TaskError};
use crate::snapshot::TaskState;
use serde::Serialize;

/// Result of a task's "check my answer" affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: usize,
    pub total: usize,
}

impl Feedback {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// Capability set every task kind provides.
///
/// A task starts untouched: `extract` returns `None` until the user acts on it
/// or a state is applied, which keeps `extract(load(s)) == s` exact.
pub trait Task: Send + Sync + std::fmt::Debug {
    fn id(&self) -> &str;

    /// Wire name of the kind, as in [`TaskState::kind`].
    fn kind(&self) -> &'static str;

    fn extract(&self) -> Option<TaskState>;

    /// Replays a saved state. Sub-ids the task doesn't know are dropped.
    fn apply(&mut self, state: &TaskState) -> Result<(), TaskError>;

    /// Recomputes and stores feedback for the current state.
    fn check(&mut self) -> Feedback;

    fn feedback(&self) -> Option<Feedback>;

    fn set_interactive(&mut self, interactive: bool);

    fn is_interactive(&self) -> bool;

    fn act(&mut self, action: &Action) -> Result<(), InteractionError>;

    /// Back to the untouched state.
    fn clear(&mut self);
}

pub(crate) fn rejected(task: &str, reason: impl Into<String>) -> InteractionError {
    InteractionError::Rejected {
        task: task.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &TaskState) -> TaskError {
    TaskError::KindMismatch {
        expected,
        found: found.kind(),
    }
}

/// Guard shared by every handler's `act`.
pub(crate) fn ensure_interactive(task: &dyn Task) -> Result<(), InteractionError> {
    if task.is_interactive() {
        Ok(())
    } else {
        Err(InteractionError::ReadOnly)
    }
}
