//! Failures of the redb-backed scrim and player tables.

use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

/// Why a scrim or player record could not be read or written.
///
/// Each variant carries the rendered redb or serde_json error.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot open scrim database: {0}")]
    Open(String),

    #[error("scrim database transaction failed: {0}")]
    Transaction(String),

    #[error("cannot open scrim table: {0}")]
    Table(String),

    #[error("cannot read record: {0}")]
    Read(String),

    #[error("cannot write record: {0}")]
    Write(String),

    #[error("cannot encode record as JSON: {0}")]
    Encode(String),

    #[error("stored record is not valid JSON for its type: {0}")]
    Decode(String),

    /// A collaborator store is down; raised by non-redb implementations.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
