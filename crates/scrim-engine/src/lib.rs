//! Scrim orchestration engine.
//!
//! Drives a scrim from open applications to a finished match. Two
//! independent state machines share the `Confirmation` record as their only
//! hand-off point: attendance (players confirm or decline once the roster is
//! full) and role assignment (the organizer edits roles in an undoable
//! workspace, then locks them into the Pending confirmations).
//!
//! # Components
//!
//! - **`lifecycle`**: Scrim state machine (Searching → … → Finished, Cancelled)
//! - **`admission`**: Postulation evaluator and organizer decisions
//! - **`attendance`**: Confirmation engine
//! - **`roles`**: Organizer-facing role workspace operations
//! - **`events`**: Event sink notified on every status change
//! - **`service`**: Per-scrim serialized orchestration over the store
//!
//! # Architecture
//!
//! ```text
//! ScrimService
//!   ├── ScrimStore (load aggregate, save after a successful mutation)
//!   ├── CandidateLookup (player profiles for selection)
//!   ├── EventSink (notified after the save commits)
//!   └── Per-scrim mutex
//!       └── working copy of Scrim
//!           ├── admission / attendance / roles (mutate the copy)
//!           └── lifecycle (guards every state change)
//! ```

pub mod admission;
pub mod attendance;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod roles;
pub mod service;

pub use error::{ScrimError, ScrimResult};
pub use events::{EventSink, MemorySink, ScrimEvent, TracingSink};
pub use service::ScrimService;
