//! Message ingress from the sandboxed worksheet.
//!
//! Messages are untrusted. They are size-capped and validated by
//! [`worksheet::boundary::parse_message`] before the adapter sees them, and the
//! freeze rule is enforced twice: a cheap status check up front and the
//! conditional write itself.

use crate::adapter::{PersistenceAdapter, ReplaceOutcome};
use crate::error::ServiceError;
use crate::host::{AssignmentHost, Caller};
use async_trait::async_trait;
use db::models::assignment::AssignmentStatus;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use sync::{MessageSink, SaveAck, SyncError};
use util::config;
use worksheet::boundary::{BoundaryMessage, parse_message};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Receipt {
    Saved { status: AssignmentStatus },
    /// A well-formed message of a type the host does not act on.
    Ignored { kind: String },
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    pub async fn receive_message(
        &self,
        caller: &Caller,
        assignment_id: i64,
        raw: &[u8],
    ) -> Result<Receipt, ServiceError> {
        let current = self.load_for_student(caller, assignment_id).await?;
        if current.status.is_frozen() {
            tracing::info!(
                assignment_id,
                status = %current.status,
                "autosave refused after hand-in"
            );
            return Err(ServiceError::Frozen);
        }

        let snapshot = match parse_message(raw, config::max_snapshot_bytes()) {
            Ok(BoundaryMessage::SaveWorksheetData { snapshot, .. }) => snapshot,
            Ok(BoundaryMessage::Ignored(kind)) => return Ok(Receipt::Ignored { kind }),
            Err(e) => {
                tracing::warn!(assignment_id, error = %e, "rejected worksheet message");
                return Err(e.into());
            }
        };

        if self.worksheet(current.worksheet_id).await?.is_quiz() {
            tracing::warn!(assignment_id, "autosave sent for a quiz");
            return Err(ServiceError::precondition(
                "Quiz answers are submitted for grading, not autosaved",
            ));
        }

        let value =
            serde_json::to_value(&snapshot).map_err(|e| ServiceError::Internal(e.to_string()))?;

        match self.store.replace_snapshot(assignment_id, &value).await? {
            ReplaceOutcome::Replaced => {
                tracing::debug!(
                    assignment_id,
                    inputs = snapshot.inputs.len(),
                    tasks = snapshot.interactive_states.len(),
                    "worksheet snapshot saved"
                );
                self.notify(
                    assignment_id,
                    "work_saved",
                    &json!({
                        "assignment_id": assignment_id,
                        "status": AssignmentStatus::InProgress
                    }),
                )
                .await;
                Ok(Receipt::Saved {
                    status: AssignmentStatus::InProgress,
                })
            }
            ReplaceOutcome::Frozen => {
                tracing::info!(assignment_id, "autosave lost the race with hand-in");
                Err(ServiceError::Frozen)
            }
            ReplaceOutcome::Missing => Err(ServiceError::NotFound("assignment")),
        }
    }
}

/// Delivers controller posts straight into a host in the same process.
pub struct InProcessSink<A = crate::adapter::SeaOrmAdapter> {
    host: Arc<AssignmentHost<A>>,
    caller: Caller,
    assignment_id: i64,
}

impl<A> InProcessSink<A> {
    pub fn new(host: Arc<AssignmentHost<A>>, caller: Caller, assignment_id: i64) -> Self {
        Self {
            host,
            caller,
            assignment_id,
        }
    }
}

#[async_trait]
impl<A: PersistenceAdapter + 'static> MessageSink for InProcessSink<A> {
    async fn receive(&self, raw: Vec<u8>) -> Result<SaveAck, SyncError> {
        match self
            .host
            .receive_message(&self.caller, self.assignment_id, &raw)
            .await
        {
            Ok(_) => Ok(SaveAck::Saved),
            Err(ServiceError::Frozen) => Ok(SaveAck::Frozen),
            Err(e) => Err(SyncError::Persistence(e.to_string())),
        }
    }
}
