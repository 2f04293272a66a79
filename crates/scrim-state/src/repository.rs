//! Collaborator interfaces consumed by the engine.

use scrim_core::{Candidate, Scrim};

use crate::error::StateResult;

/// Durable home of scrim aggregates.
///
/// `save_scrim` replaces the whole aggregate. Failures are reported to the
/// caller as-is; implementations must not leave a partially written scrim.
pub trait ScrimStore: Send + Sync {
    fn find_scrim(&self, id: &str) -> StateResult<Option<Scrim>>;

    fn save_scrim(&self, scrim: &Scrim) -> StateResult<()>;
}

/// Read-only access to player profiles for candidate selection.
pub trait CandidateLookup: Send + Sync {
    fn find_candidate(&self, user_id: &str) -> StateResult<Option<Candidate>>;
}
