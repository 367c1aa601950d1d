//! Core types for DontBe feed synchronization.
//!
//! This crate holds the pure parts of the sync engine: the response
//! envelope, the pagination cursor, page merging, and the ghost-reason
//! selector. Nothing here performs I/O; the client crate drives these
//! types against a transport.

mod cursor;
mod envelope;
pub mod model;
mod page;
mod reason;

pub use cursor::Cursor;
pub use envelope::ResponseEnvelope;
pub use page::{Identified, MergeOutcome, Page, PagedList};
pub use reason::{GHOST_REASONS, ReasonError, ReasonSelector};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one list-sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// No fetch in flight.
    #[default]
    Idle,
    /// Exactly one fetch is in flight.
    Fetching,
    /// The last fetch failed; previously accumulated items are still valid.
    Failed,
}

/// Error taxonomy surfaced to rendering code.
///
/// Each client-side error type maps onto one of these so screens can pick
/// between a toast, an inline warning, or an informational notice without
/// matching on transport details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or decoding failure. Not retried by the core.
    Transport,
    /// A duplicate action was attempted while one was pending.
    AlreadyInProgress,
    /// The server reported a duplicate transparency vote.
    AlreadyVoted,
    /// A reason was confirmed with nothing selected.
    EmptyValidation,
    /// A reason index outside the offered options.
    InvalidSelection,
    /// Undo was requested for an action that cannot be undone.
    NotReversible,
    /// No auth token was available; nothing was sent.
    MissingToken,
    /// The server answered with an unexpected status.
    Rejected,
}

impl ErrorKind {
    /// Whether the rendering layer should show an informational notice
    /// instead of an error banner.
    pub fn is_informational(self) -> bool {
        matches!(self, ErrorKind::AlreadyVoted | ErrorKind::EmptyValidation)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::AlreadyInProgress => "already in progress",
            ErrorKind::AlreadyVoted => "already voted",
            ErrorKind::EmptyValidation => "empty selection",
            ErrorKind::InvalidSelection => "invalid selection",
            ErrorKind::NotReversible => "not reversible",
            ErrorKind::MissingToken => "missing token",
            ErrorKind::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

impl From<&ReasonError> for ErrorKind {
    fn from(err: &ReasonError) -> Self {
        match err {
            ReasonError::EmptySelection => ErrorKind::EmptyValidation,
            ReasonError::OutOfRange { .. } => ErrorKind::InvalidSelection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn informational_kinds() {
        assert!(ErrorKind::AlreadyVoted.is_informational());
        assert!(ErrorKind::EmptyValidation.is_informational());
        assert!(!ErrorKind::Transport.is_informational());
        assert!(!ErrorKind::Rejected.is_informational());
    }

    #[test]
    fn reason_errors_keep_their_kind() {
        assert_eq!(
            ErrorKind::from(&ReasonError::EmptySelection),
            ErrorKind::EmptyValidation
        );
        let kind = ErrorKind::from(&ReasonError::OutOfRange { index: 9, len: 6 });
        assert_eq!(kind, ErrorKind::InvalidSelection);
        assert!(!kind.is_informational());
        assert_eq!(ErrorKind::NotReversible.to_string(), "not reversible");
    }

    #[test]
    fn phase_defaults_to_idle() {
        assert_eq!(SyncPhase::default(), SyncPhase::Idle);
    }
}
