//! Assignment of one worksheet to one student in one class.
//!
//! `student_work` holds the latest full snapshot (or quiz submission) as an
//! opaque JSON value. It is always written whole, in a single statement.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub worksheet_id: i64,
    pub student_id: i64,
    pub status: AssignmentStatus,
    /// Free-text grade, e.g. "8/10", "O" or "2 / 3".
    pub mark: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub student_work: Option<Json>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Coarse lifecycle of an assignment. Variants are declared in lifecycle order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "assignment_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AssignmentStatus {
    #[sea_orm(string_value = "not_started")]
    NotStarted,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "handed_in")]
    HandedIn,

    #[sea_orm(string_value = "completed")]
    Completed,
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl AssignmentStatus {
    /// Statuses in which the stored snapshot may still be replaced by an autosave.
    pub const EDITABLE: [AssignmentStatus; 2] =
        [AssignmentStatus::NotStarted, AssignmentStatus::InProgress];

    pub fn accepts_autosave(self) -> bool {
        Self::EDITABLE.contains(&self)
    }

    /// Once handed in the student's work is frozen for good.
    pub fn is_frozen(self) -> bool {
        !self.accepts_autosave()
    }

    /// Student-driven transitions. Marking is handled separately since a
    /// marker may finalize from any status.
    pub fn can_transition_to(self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress) | (NotStarted, HandedIn) | (InProgress, HandedIn)
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,

    #[sea_orm(
        belongs_to = "super::worksheet::Entity",
        from = "Column::WorksheetId",
        to = "super::worksheet::Column::Id"
    )]
    Worksheet,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::worksheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worksheet.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        class_id: i64,
        worksheet_id: i64,
        student_id: i64,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        ActiveModel {
            class_id: Set(class_id),
            worksheet_id: Set(worksheet_id),
            student_id: Set(student_id),
            status: Set(AssignmentStatus::NotStarted),
            mark: Set(None),
            feedback: Set(None),
            student_work: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// All assignments of `worksheet_id` in `class_id`, ordered by id.
    pub async fn find_for_class_worksheet<C>(
        db: &C,
        class_id: i64,
        worksheet_id: i64,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::WorksheetId.eq(worksheet_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.student_id == user_id
    }
}
