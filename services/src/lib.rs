//! Trusted host side of the worksheet protocol.
//!
//! [`AssignmentHost`] owns every operation that reads or writes an assignment:
//! message ingress from the sandbox, hand-in, marking, quiz grading, replay and
//! bulk feedback. Storage goes through a [`PersistenceAdapter`] whose writes are
//! single conditional statements, so no snapshot is ever partially written.

pub mod adapter;
pub mod bulk_feedback;
pub mod error;
pub mod grading;
pub mod host;
pub mod lifecycle;
pub mod replay;
pub mod sync_host;

pub use adapter::{PersistenceAdapter, ReplaceOutcome, SeaOrmAdapter};
pub use bulk_feedback::{GRADES, ImportSummary, TextExport};
pub use error::ServiceError;
pub use grading::{QuizGrade, QuizSubmission};
pub use host::{AssignmentHost, Caller};
pub use replay::{QuizPrompt, QuizReview, ReplayView, StudentView};
pub use sync_host::{InProcessSink, Receipt};
