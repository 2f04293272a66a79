//! scrim-state: persistence collaborators for the scrim engine.
//!
//! Defines the narrow interfaces the engine consumes (`ScrimStore`,
//! `CandidateLookup`) and a [redb](https://docs.rs/redb)-backed
//! implementation of both.
//!
//! # Architecture
//!
//! A `Scrim` aggregate is JSON-serialized as one value keyed by its id, so
//! a save is a single write transaction: either the whole aggregate lands or
//! none of it does. Player profiles live in a second table keyed by user id.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod repository;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use repository::{CandidateLookup, ScrimStore};
pub use store::StateStore;
