use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("host rejected the save ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not persist snapshot: {0}")]
    Persistence(String),
}
