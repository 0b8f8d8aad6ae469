//! Persistence adapter for assignments.
//!
//! Every mutation is one `UPDATE ... WHERE` whose condition encodes the
//! lifecycle rule, so a concurrent hand-in can never be overtaken by a late
//! autosave and the snapshot is always replaced whole.

use async_trait::async_trait;
use chrono::Utc;
use db::models::assignment::{self, AssignmentStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::Json;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Iterable, QueryFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The assignment exists but no longer accepts autosave.
    Frozen,
    Missing,
}

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<assignment::Model>, DbErr>;

    /// Replaces the whole snapshot and moves `NotStarted` to `InProgress`.
    /// Refused once the assignment is handed in.
    async fn replace_snapshot(&self, id: i64, snapshot: &Json) -> Result<ReplaceOutcome, DbErr>;

    /// Moves to `status` if the current status may transition there.
    /// Returns whether a row changed.
    async fn set_status(&self, id: i64, status: AssignmentStatus) -> Result<bool, DbErr>;

    /// Records a marker's mark and feedback and marks the assignment `Completed`.
    async fn finalize(
        &self,
        id: i64,
        mark: Option<&str>,
        feedback: Option<&str>,
    ) -> Result<bool, DbErr>;

    /// Stores a graded quiz submission in one statement, unless already `Completed`.
    async fn record_quiz(
        &self,
        id: i64,
        submission: &Json,
        mark: &str,
        feedback: &str,
    ) -> Result<bool, DbErr>;
}

/// Statuses that may move to `next` through a student action.
fn predecessors(next: AssignmentStatus) -> Vec<AssignmentStatus> {
    AssignmentStatus::iter()
        .filter(|s| s.can_transition_to(next))
        .collect()
}

#[derive(Clone, Debug)]
pub struct SeaOrmAdapter {
    db: DatabaseConnection,
}

impl SeaOrmAdapter {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl PersistenceAdapter for SeaOrmAdapter {
    async fn get(&self, id: i64) -> Result<Option<assignment::Model>, DbErr> {
        assignment::Entity::find_by_id(id).one(&self.db).await
    }

    async fn replace_snapshot(&self, id: i64, snapshot: &Json) -> Result<ReplaceOutcome, DbErr> {
        let res = assignment::Entity::update_many()
            .set(assignment::ActiveModel {
                student_work: Set(Some(snapshot.clone())),
                status: Set(AssignmentStatus::InProgress),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(assignment::Column::Id.eq(id))
            .filter(assignment::Column::Status.is_in(AssignmentStatus::EDITABLE))
            .exec(&self.db)
            .await?;

        if res.rows_affected > 0 {
            return Ok(ReplaceOutcome::Replaced);
        }
        Ok(match self.get(id).await? {
            Some(_) => ReplaceOutcome::Frozen,
            None => ReplaceOutcome::Missing,
        })
    }

    async fn set_status(&self, id: i64, status: AssignmentStatus) -> Result<bool, DbErr> {
        let from = predecessors(status);
        if from.is_empty() {
            return Ok(false);
        }
        let res = assignment::Entity::update_many()
            .set(assignment::ActiveModel {
                status: Set(status),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(assignment::Column::Id.eq(id))
            .filter(assignment::Column::Status.is_in(from))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn finalize(
        &self,
        id: i64,
        mark: Option<&str>,
        feedback: Option<&str>,
    ) -> Result<bool, DbErr> {
        let res = assignment::Entity::update_many()
            .set(assignment::ActiveModel {
                mark: Set(mark.map(str::to_owned)),
                feedback: Set(feedback.map(str::to_owned)),
                status: Set(AssignmentStatus::Completed),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(assignment::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn record_quiz(
        &self,
        id: i64,
        submission: &Json,
        mark: &str,
        feedback: &str,
    ) -> Result<bool, DbErr> {
        let res = assignment::Entity::update_many()
            .set(assignment::ActiveModel {
                student_work: Set(Some(submission.clone())),
                mark: Set(Some(mark.to_owned())),
                feedback: Set(Some(feedback.to_owned())),
                status: Set(AssignmentStatus::Completed),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(assignment::Column::Id.eq(id))
            .filter(assignment::Column::Status.ne(AssignmentStatus::Completed))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
