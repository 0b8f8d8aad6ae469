//! Student hand-in and teacher marking.
//!
//! `NotStarted -> InProgress` happens on the first accepted autosave (see
//! [`crate::sync_host`]). Hand-in is a compare-and-set over the statuses that
//! may precede `HandedIn`. Marking finalizes from any status.

use crate::adapter::PersistenceAdapter;
use crate::error::ServiceError;
use crate::host::{AssignmentHost, Caller};
use db::models::assignment::{self, AssignmentStatus};
use serde_json::json;

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    /// Freezes the student's work. Later autosaves are refused.
    pub async fn hand_in(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<AssignmentStatus, ServiceError> {
        let current = self.load_for_student(caller, assignment_id).await?;
        if current.status.is_frozen() {
            return Err(ServiceError::precondition(format!(
                "Assignment is already {}",
                current.status
            )));
        }

        if !self
            .store
            .set_status(assignment_id, AssignmentStatus::HandedIn)
            .await?
        {
            return Err(ServiceError::precondition(
                "Assignment changed state before it could be handed in",
            ));
        }

        tracing::info!(assignment_id, student_id = caller.user_id, "assignment handed in");
        self.notify(
            assignment_id,
            "handed_in",
            &json!({ "assignment_id": assignment_id, "status": AssignmentStatus::HandedIn }),
        )
        .await;
        Ok(AssignmentStatus::HandedIn)
    }

    /// Records a teacher's mark and feedback, replacing both, and completes the assignment.
    pub async fn record_mark(
        &self,
        caller: &Caller,
        assignment_id: i64,
        mark: Option<&str>,
        feedback: Option<&str>,
    ) -> Result<assignment::Model, ServiceError> {
        let before = self.load_for_teacher(caller, assignment_id).await?;

        let mark = non_empty(mark);
        let feedback = non_empty(feedback);
        if mark.is_none() && feedback.is_none() {
            return Err(ServiceError::InvalidInput(
                "A mark or feedback is required".into(),
            ));
        }
        if before.status.accepts_autosave() {
            tracing::info!(
                assignment_id,
                status = %before.status,
                "marking work that was not handed in"
            );
        }

        if !self.store.finalize(assignment_id, mark, feedback).await? {
            return Err(ServiceError::NotFound("assignment"));
        }
        let marked = self.find(assignment_id).await?;

        tracing::info!(assignment_id, marker_id = caller.user_id, "assignment marked");
        self.notify(
            assignment_id,
            "marked",
            &json!({
                "assignment_id": assignment_id,
                "status": marked.status,
                "mark": marked.mark
            }),
        )
        .await;
        Ok(marked)
    }
}
