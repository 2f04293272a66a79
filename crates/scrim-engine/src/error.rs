//! Engine error types.

use scrim_core::{ScrimState, WorkspaceError};
use thiserror::Error;

/// Errors surfaced by engine operations. None of them is retried internally.
#[derive(Debug, Error)]
pub enum ScrimError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid transition from {from} to {attempted}")]
    InvalidTransition {
        from: ScrimState,
        attempted: ScrimState,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("workspace is locked")]
    Locked,

    #[error("nothing to undo")]
    EmptyHistory,

    #[error("state store error: {0}")]
    Store(#[from] scrim_state::StateError),
}

pub type ScrimResult<T> = Result<T, ScrimError>;

impl From<WorkspaceError> for ScrimError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::Locked => ScrimError::Locked,
            WorkspaceError::EmptyHistory => ScrimError::EmptyHistory,
            WorkspaceError::ParticipantNotFound(id) => {
                ScrimError::NotFound(format!("participant {id}"))
            }
            WorkspaceError::UnknownRole(_) => ScrimError::Validation(err.to_string()),
            WorkspaceError::AlreadyPresent(_) | WorkspaceError::RoleTaken { .. } => {
                ScrimError::Conflict(err.to_string())
            }
        }
    }
}
