use crate::transport::TransportError;
use dontbe_core::{ErrorKind, ReasonError};

/// Failure of a page or record fetch.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("not logged in")]
    MissingToken,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::MissingToken => ErrorKind::MissingToken,
            SyncError::Transport(_) | SyncError::Decode(_) => ErrorKind::Transport,
            SyncError::Rejected { .. } => ErrorKind::Rejected,
        }
    }
}

/// Failure of an optimistic toggle.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("a request for this target is already in progress")]
    AlreadyInProgress,
    #[error("already voted on this target")]
    AlreadyVoted,
    #[error("{0} cannot be undone")]
    NotReversible(&'static str),
    #[error("not logged in")]
    MissingToken,
    #[error(transparent)]
    Reason(#[from] ReasonError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            ActionError::NotReversible(_) => ErrorKind::NotReversible,
            ActionError::AlreadyVoted => ErrorKind::AlreadyVoted,
            ActionError::MissingToken => ErrorKind::MissingToken,
            ActionError::Reason(err) => ErrorKind::from(err),
            ActionError::Transport(_) | ActionError::Encode(_) => ErrorKind::Transport,
            ActionError::Rejected { .. } => ErrorKind::Rejected,
        }
    }
}
