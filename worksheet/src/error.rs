use thiserror::Error;

/// A user action the document refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("worksheet is read-only")]
    ReadOnly,

    #[error("no element or task with id '{0}'")]
    UnknownTarget(String),

    #[error("task '{task}' rejected the action: {reason}")]
    Rejected { task: String, reason: String },
}

/// Why a snapshot entry could not be applied to a task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("expected {expected} state, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("option {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}

/// A message from the embedded document that failed host-side validation.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("message is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("message is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("message must be a JSON object")]
    NotAnObject,

    #[error("message has no string 'type'")]
    MissingType,

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("'{0}' must be a JSON object")]
    FieldNotObject(&'static str),
}
