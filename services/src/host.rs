//! The assignment host: identity, access checks and live event emission shared
//! by every host operation.

use crate::adapter::{PersistenceAdapter, SeaOrmAdapter};
use crate::error::ServiceError;
use db::models::assignment;
use db::models::class;
use db::models::user::UserRole;
use db::models::worksheet;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use util::state::AppState;
use util::ws::{WebSocketManager, assignment_topic, emit};

/// Who is calling, as established by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: UserRole,
}

impl Caller {
    pub fn student(user_id: i64) -> Self {
        Self {
            user_id,
            role: UserRole::Student,
        }
    }

    pub fn teacher(user_id: i64) -> Self {
        Self {
            user_id,
            role: UserRole::Teacher,
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }
}

pub struct AssignmentHost<A = SeaOrmAdapter> {
    pub(crate) db: DatabaseConnection,
    pub(crate) store: A,
    ws: Option<WebSocketManager>,
}

impl AssignmentHost<SeaOrmAdapter> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            store: SeaOrmAdapter::new(db.clone()),
            db,
            ws: None,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db_clone()).with_ws(state.ws_clone())
    }
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    /// Host over a custom adapter. `db` still serves class, worksheet and user lookups.
    pub fn with_store(db: DatabaseConnection, store: A) -> Self {
        Self {
            db,
            store,
            ws: None,
        }
    }

    pub fn with_ws(mut self, ws: WebSocketManager) -> Self {
        self.ws = Some(ws);
        self
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    pub(crate) async fn find(&self, assignment_id: i64) -> Result<assignment::Model, ServiceError> {
        self.store
            .get(assignment_id)
            .await?
            .ok_or(ServiceError::NotFound("assignment"))
    }

    /// Loads an assignment the caller owns as its student.
    pub async fn load_for_student(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<assignment::Model, ServiceError> {
        let a = self.find(assignment_id).await?;
        if !a.is_owned_by(caller.user_id) {
            tracing::warn!(
                assignment_id,
                user_id = caller.user_id,
                "student access to someone else's assignment refused"
            );
            return Err(ServiceError::denied("You do not own this assignment"));
        }
        Ok(a)
    }

    /// Loads an assignment from a class the caller teaches.
    pub async fn load_for_teacher(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<assignment::Model, ServiceError> {
        let a = self.find(assignment_id).await?;
        self.ensure_teacher_of(caller, a.class_id).await?;
        Ok(a)
    }

    /// Loads an assignment visible to the caller, as owner or as class teacher.
    pub async fn get_assignment(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<assignment::Model, ServiceError> {
        let a = self.find(assignment_id).await?;
        if a.is_owned_by(caller.user_id) {
            return Ok(a);
        }
        self.ensure_teacher_of(caller, a.class_id).await?;
        Ok(a)
    }

    pub async fn ensure_teacher_of(
        &self,
        caller: &Caller,
        class_id: i64,
    ) -> Result<(), ServiceError> {
        if caller.is_teacher()
            && class::Model::is_teacher_of(&self.db, class_id, caller.user_id).await?
        {
            Ok(())
        } else {
            Err(ServiceError::denied("You do not teach this class"))
        }
    }

    pub(crate) async fn worksheet(
        &self,
        worksheet_id: i64,
    ) -> Result<worksheet::Model, ServiceError> {
        worksheet::Entity::find_by_id(worksheet_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("worksheet"))
    }

    /// Broadcasts `event` on the assignment's topic, if live events are wired.
    pub(crate) async fn notify<T: Serialize>(&self, assignment_id: i64, event: &str, payload: &T) {
        if let Some(ws) = &self.ws {
            emit(ws, &assignment_topic(assignment_id), event, payload).await;
        }
    }
}
