//! StateStore: redb-backed persistence for scrims and player profiles.
//!
//! All values are JSON-serialized into redb's `&[u8]` value columns. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use scrim_core::{Candidate, Scrim};

use crate::error::{StateError, StateResult};
use crate::repository::{CandidateLookup, ScrimStore};
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SCRIMS).map_err(map_err!(Table))?;
        txn.open_table(PLAYERS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Scrims ─────────────────────────────────────────────────────

    /// Insert or replace a scrim aggregate.
    pub fn put_scrim(&self, scrim: &Scrim) -> StateResult<()> {
        let key = scrim.table_key();
        self.put(SCRIMS, &key, scrim)?;
        debug!(%key, state = %scrim.state, "scrim stored");
        Ok(())
    }

    /// Get a scrim by id.
    pub fn get_scrim(&self, id: &str) -> StateResult<Option<Scrim>> {
        self.get(SCRIMS, id)
    }

    /// List all scrims.
    pub fn list_scrims(&self) -> StateResult<Vec<Scrim>> {
        self.list(SCRIMS)
    }

    /// Delete a scrim by id. Returns true if it existed.
    pub fn delete_scrim(&self, id: &str) -> StateResult<bool> {
        let existed = self.delete(SCRIMS, id)?;
        debug!(%id, existed, "scrim deleted");
        Ok(existed)
    }

    // ── Players ────────────────────────────────────────────────────

    /// Insert or update a player profile.
    pub fn put_player(&self, candidate: &Candidate) -> StateResult<()> {
        self.put(PLAYERS, &candidate.user_id, candidate)
    }

    /// Get a player profile by user id.
    pub fn get_player(&self, user_id: &str) -> StateResult<Option<Candidate>> {
        self.get(PLAYERS, user_id)
    }

    /// List all player profiles.
    pub fn list_players(&self) -> StateResult<Vec<Candidate>> {
        self.list(PLAYERS)
    }

    // ── Generic helpers ────────────────────────────────────────────

    fn put<T: Serialize>(
        &self,
        table: JsonTable,
        key: &str,
        value: &T,
    ) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Encode))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(
        &self,
        table: JsonTable,
        key: &str,
    ) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Decode))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list<T: DeserializeOwned>(&self, table: JsonTable) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let item: T = serde_json::from_slice(value.value()).map_err(map_err!(Decode))?;
            results.push(item);
        }
        Ok(results)
    }

    fn delete(&self, table: JsonTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }
}

impl ScrimStore for StateStore {
    fn find_scrim(&self, id: &str) -> StateResult<Option<Scrim>> {
        self.get_scrim(id)
    }

    fn save_scrim(&self, scrim: &Scrim) -> StateResult<()> {
        self.put_scrim(scrim)
    }
}

impl CandidateLookup for StateStore {
    fn find_candidate(&self, user_id: &str) -> StateResult<Option<Candidate>> {
        self.get_player(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::{
        AdmissionConstraints, Confirmation, GameFormat, Postulation, PostulationStatus, RankRange,
        RoleWorkspace, ScrimState, StrategyKind,
    };

    fn test_scrim(id: &str) -> Scrim {
        Scrim {
            id: id.to_string(),
            format: GameFormat {
                name: "5v5".to_string(),
                capacity: 5,
                roles: vec!["entry".to_string(), "support".to_string()],
            },
            scheduled_at: 2000,
            constraints: AdmissionConstraints {
                rank: RankRange::new(10, 20),
                max_latency_ms: 80,
            },
            strategy: StrategyKind::RankProximity,
            organizer_id: "org".to_string(),
            state: ScrimState::Searching,
            postulations: Vec::new(),
            confirmations: Vec::new(),
            workspace: RoleWorkspace::new(vec!["entry".to_string(), "support".to_string()], 16),
            created_at: 1000,
            updated_at: 1000,
        }
    }

    fn test_player(id: &str, rank: u32) -> Candidate {
        Candidate {
            user_id: id.to_string(),
            rank,
            latency_ms: 30,
            fair_play_rate: 0.9,
            abandon_rate: 0.05,
            preferred_role: None,
        }
    }

    // ── Scrim CRUD ─────────────────────────────────────────────────

    #[test]
    fn scrim_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let scrim = test_scrim("friday");

        store.put_scrim(&scrim).unwrap();
        let retrieved = store.get_scrim("friday").unwrap();

        assert_eq!(retrieved, Some(scrim));
    }

    #[test]
    fn scrim_get_nonexistent_returns_none() {
        let store = StateStore::open_in_memory().unwrap();
        assert!(store.get_scrim("nope").unwrap().is_none());
    }

    #[test]
    fn scrim_save_replaces_whole_aggregate() {
        let store = StateStore::open_in_memory().unwrap();
        let mut scrim = test_scrim("friday");
        store.save_scrim(&scrim).unwrap();

        let mut postulation = Postulation::new("alice", 15, 20, 1100);
        postulation.status = PostulationStatus::Accepted;
        scrim.postulations.push(postulation);
        scrim.confirmations.push(Confirmation::pending("alice", 1100));
        scrim.workspace.invite("alice", Some("entry")).unwrap();
        scrim.state = ScrimState::LobbyFull;
        store.save_scrim(&scrim).unwrap();

        let mut retrieved = store.find_scrim("friday").unwrap().unwrap();
        assert_eq!(retrieved.state, ScrimState::LobbyFull);
        assert_eq!(retrieved.accepted_count(), 1);
        assert_eq!(retrieved.confirmations.len(), 1);
        // Undo history survives the round trip.
        assert!(retrieved.workspace.undo().is_ok());
    }

    #[test]
    fn scrim_list_and_delete() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_scrim(&test_scrim("a")).unwrap();
        store.put_scrim(&test_scrim("b")).unwrap();

        assert_eq!(store.list_scrims().unwrap().len(), 2);
        assert!(store.delete_scrim("a").unwrap());
        assert!(!store.delete_scrim("a").unwrap());
        assert_eq!(store.list_scrims().unwrap().len(), 1);
    }

    // ── Player CRUD ────────────────────────────────────────────────

    #[test]
    fn player_put_and_lookup() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_player(&test_player("alice", 12)).unwrap();
        store.put_player(&test_player("bob", 18)).unwrap();

        let alice = store.find_candidate("alice").unwrap().unwrap();
        assert_eq!(alice.rank, 12);
        assert!(store.find_candidate("carol").unwrap().is_none());
        assert_eq!(store.list_players().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_scrim_record_is_a_decode_error() {
        let store = StateStore::open_in_memory().unwrap();
        let txn = store.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(SCRIMS).unwrap();
            table.insert("broken", b"{not json".as_slice()).unwrap();
        }
        txn.commit().unwrap();

        let err = store.find_scrim("broken").unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
        assert!(err.to_string().starts_with("stored record is not valid JSON"));
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.put_scrim(&test_scrim("friday")).unwrap();
            store.put_player(&test_player("alice", 12)).unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        let scrim = store.get_scrim("friday").unwrap();
        assert!(scrim.is_some());
        assert_eq!(scrim.unwrap().organizer_id, "org");
        assert!(store.get_player("alice").unwrap().is_some());
    }

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_scrims().unwrap().is_empty());
        assert!(store.list_players().unwrap().is_empty());
        assert!(!store.delete_scrim("nope").unwrap());
    }
}
