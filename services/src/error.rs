use sea_orm::DbErr;
use thiserror::Error;
use worksheet::BoundaryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Precondition(String),

    #[error("assignment has been handed in and can no longer be edited")]
    Frozen,

    #[error("malformed worksheet message: {0}")]
    Malformed(#[from] BoundaryError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn denied(msg: impl Into<String>) -> Self {
        ServiceError::PermissionDenied(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        ServiceError::Precondition(msg.into())
    }
}
