//! scrim-core: shared data model for scrim formation.
//!
//! Holds the `Scrim` aggregate and its records (postulations, confirmations),
//! the organizer's role-assignment workspace, and `scrim.toml` parsing.
//! Behavior that spans records (admission, attendance, lifecycle) lives in
//! `scrim-engine`.

pub mod config;
pub mod roster;
pub mod types;

pub use config::ScrimConfig;
pub use roster::{ActionRecord, FinalizeReport, Participant, RoleWorkspace, WorkspaceError};
pub use types::*;
