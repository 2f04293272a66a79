//! redb table definitions for the scrim store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Scrim aggregates keyed by `{scrim_id}`.
pub const SCRIMS: JsonTable = TableDefinition::new("scrims");

/// Player profiles keyed by `{user_id}`.
pub const PLAYERS: JsonTable = TableDefinition::new("players");

/// Shape shared by every table: string key, JSON value.
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;
