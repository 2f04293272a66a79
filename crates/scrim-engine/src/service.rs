//! ScrimService: per-scrim serialized orchestration.
//!
//! Every mutating call follows the same path:
//! 1. Take the scrim's mutex (different scrims never contend)
//! 2. Load the aggregate from the store into a working copy
//! 3. Run the engine operation against the copy, collecting events
//! 4. Save the copy, then hand the events to the sink
//! 5. Drop the scrim's lock entry if nobody else is waiting on it
//!
//! An error at any step drops the working copy, so the stored scrim and the
//! sink never see a half-applied operation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use scrim_core::{
    epoch_secs, ActionRecord, Candidate, FinalizeReport, Postulation, RoleWorkspace, Scrim,
    ScrimConfig, ScrimId, ScrimState, StrategyKind,
};
use scrim_core::config::ScrimDefinition;
use scrim_select::{Matchmaker, Requirements};
use scrim_state::{CandidateLookup, ScrimStore, StateStore};

use crate::error::{ScrimError, ScrimResult};
use crate::events::{EventSink, ScrimEvent, TracingSink};
use crate::{admission, attendance, lifecycle, roles};

pub struct ScrimService {
    store: Arc<dyn ScrimStore>,
    candidates: Arc<dyn CandidateLookup>,
    sink: Arc<dyn EventSink>,
    config: ScrimConfig,
    /// Per-scrim mutexes: scrim_id → lock.
    locks: RwLock<HashMap<ScrimId, Arc<Mutex<()>>>>,
}

impl ScrimService {
    pub fn new(
        store: Arc<dyn ScrimStore>,
        candidates: Arc<dyn CandidateLookup>,
        config: ScrimConfig,
    ) -> Self {
        Self {
            store,
            candidates,
            sink: Arc::new(TracingSink),
            config,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Use one redb store for both scrims and player profiles.
    pub fn with_state_store(store: StateStore, config: ScrimConfig) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, config)
    }

    /// Replace the default tracing sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    // ── Scrims ─────────────────────────────────────────────────────

    /// Open a new scrim in `Searching`.
    pub async fn create_scrim(&self, definition: &ScrimDefinition) -> ScrimResult<Scrim> {
        validate_definition(definition)?;
        let lock = self.lock_for(&definition.id).await;
        let result = {
            let _guard = lock.lock().await;
            self.insert_scrim(definition)
        };
        self.release(&definition.id, lock).await;
        result
    }

    fn insert_scrim(&self, definition: &ScrimDefinition) -> ScrimResult<Scrim> {
        if self.store.find_scrim(&definition.id)?.is_some() {
            return Err(ScrimError::Conflict(format!(
                "scrim {} already exists",
                definition.id
            )));
        }

        let now = epoch_secs();
        let scrim = Scrim {
            id: definition.id.clone(),
            format: definition.format.clone(),
            scheduled_at: definition.scheduled_at,
            constraints: definition.constraints(),
            strategy: definition.strategy,
            organizer_id: definition.organizer_id.clone(),
            state: ScrimState::Searching,
            postulations: Vec::new(),
            confirmations: Vec::new(),
            workspace: RoleWorkspace::new(
                definition.format.roles.clone(),
                self.config.engine.history_limit,
            ),
            created_at: now,
            updated_at: now,
        };
        self.store.save_scrim(&scrim)?;

        info!(
            scrim = %scrim.id,
            organizer = %scrim.organizer_id,
            capacity = scrim.capacity(),
            "scrim created"
        );
        self.sink.notify(&ScrimEvent::ScrimCreated {
            scrim_id: scrim.id.clone(),
            organizer_id: scrim.organizer_id.clone(),
        });
        Ok(scrim)
    }

    pub async fn get_scrim(&self, scrim_id: &str) -> ScrimResult<Scrim> {
        self.load(scrim_id)
    }

    // ── Admission ──────────────────────────────────────────────────

    /// Submit an application; the returned postulation carries the decision.
    pub async fn apply(
        &self,
        scrim_id: &str,
        applicant_id: &str,
        rank: u32,
        latency_ms: u32,
    ) -> ScrimResult<Postulation> {
        let policy = self.config.admission.clone();
        self.mutate(scrim_id, "apply", |scrim, events, now| {
            admission::evaluate(scrim, &policy, applicant_id, rank, latency_ms, now, events)
        })
        .await
    }

    pub async fn accept_postulation(
        &self,
        scrim_id: &str,
        actor_id: &str,
        applicant_id: &str,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "accept_postulation", |scrim, events, now| {
            admission::accept_pending(scrim, actor_id, applicant_id, now, events)
        })
        .await
    }

    pub async fn reject_postulation(
        &self,
        scrim_id: &str,
        actor_id: &str,
        applicant_id: &str,
        reason: &str,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "reject_postulation", |scrim, events, now| {
            admission::reject_pending(scrim, actor_id, applicant_id, reason, now, events)
        })
        .await
    }

    // ── Attendance ─────────────────────────────────────────────────

    pub async fn confirm_attendance(&self, scrim_id: &str, applicant_id: &str) -> ScrimResult<()> {
        self.mutate(scrim_id, "confirm_attendance", |scrim, events, now| {
            attendance::confirm(scrim, applicant_id, now, events)
        })
        .await
    }

    pub async fn decline_attendance(&self, scrim_id: &str, applicant_id: &str) -> ScrimResult<()> {
        self.mutate(scrim_id, "decline_attendance", |scrim, events, now| {
            attendance::decline(scrim, applicant_id, now, events)
        })
        .await
    }

    // ── Selection ──────────────────────────────────────────────────

    /// Rank `pool` for the open slots of `scrim` with its stored strategy.
    ///
    /// The organizer and players who already applied never make the shortlist.
    pub fn select_candidates(&self, pool: &[Candidate], scrim: &Scrim) -> Vec<Candidate> {
        let fresh: Vec<Candidate> = pool
            .iter()
            .filter(|c| c.user_id != scrim.organizer_id)
            .filter(|c| scrim.postulation(&c.user_id).is_none())
            .cloned()
            .collect();
        if fresh.len() < pool.len() {
            debug!(
                scrim = %scrim.id,
                skipped = pool.len() - fresh.len(),
                "rostered players left out of selection"
            );
        }

        let matchmaker = Matchmaker::for_kind(scrim.strategy, &self.config.selection);
        matchmaker.select(&fresh, &Requirements::from_scrim(scrim))
    }

    /// Resolve player ids through the candidate lookup, then select.
    ///
    /// Ids without a profile are skipped.
    pub async fn select_candidates_for(
        &self,
        scrim_id: &str,
        pool_ids: &[String],
    ) -> ScrimResult<Vec<Candidate>> {
        let scrim = self.load(scrim_id)?;
        let mut pool = Vec::with_capacity(pool_ids.len());
        for user_id in pool_ids {
            match self.candidates.find_candidate(user_id)? {
                Some(candidate) => pool.push(candidate),
                None => warn!(scrim = %scrim_id, player = %user_id, "no profile for player, skipped"),
            }
        }
        Ok(self.select_candidates(&pool, &scrim))
    }

    /// Organizer swaps the selection strategy stored on the scrim.
    pub async fn set_strategy(
        &self,
        scrim_id: &str,
        actor_id: &str,
        kind: StrategyKind,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "set_strategy", |scrim, _events, _now| {
            roles::ensure_organizer(scrim, actor_id)?;
            info!(scrim = %scrim.id, from = %scrim.strategy, to = %kind, "selection strategy changed");
            scrim.strategy = kind;
            Ok(())
        })
        .await
    }

    // ── Role workspace ─────────────────────────────────────────────

    pub async fn invite(
        &self,
        scrim_id: &str,
        actor_id: &str,
        user_id: &str,
        role: Option<&str>,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "invite", |scrim, _events, _now| {
            roles::invite(scrim, actor_id, user_id, role)
        })
        .await
    }

    pub async fn assign_role(
        &self,
        scrim_id: &str,
        actor_id: &str,
        user_id: &str,
        role: &str,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "assign_role", |scrim, _events, _now| {
            roles::assign_role(scrim, actor_id, user_id, role)
        })
        .await
    }

    pub async fn swap(
        &self,
        scrim_id: &str,
        actor_id: &str,
        first: &str,
        second: &str,
    ) -> ScrimResult<()> {
        self.mutate(scrim_id, "swap", |scrim, _events, _now| {
            roles::swap(scrim, actor_id, first, second)
        })
        .await
    }

    pub async fn undo(&self, scrim_id: &str, actor_id: &str) -> ScrimResult<ActionRecord> {
        self.mutate(scrim_id, "undo", |scrim, _events, _now| roles::undo(scrim, actor_id))
            .await
    }

    pub async fn finalize_roles(
        &self,
        scrim_id: &str,
        actor_id: &str,
    ) -> ScrimResult<FinalizeReport> {
        self.mutate(scrim_id, "finalize_roles", |scrim, events, _now| {
            roles::finalize(scrim, actor_id, events)
        })
        .await
    }

    // ── Organizer lifecycle ────────────────────────────────────────

    pub async fn start(&self, scrim_id: &str, actor_id: &str) -> ScrimResult<()> {
        self.mutate(scrim_id, "start", |scrim, events, _now| {
            roles::ensure_organizer(scrim, actor_id)?;
            lifecycle::start(scrim, events)
        })
        .await
    }

    pub async fn finish(&self, scrim_id: &str, actor_id: &str) -> ScrimResult<()> {
        self.mutate(scrim_id, "finish", |scrim, events, _now| {
            roles::ensure_organizer(scrim, actor_id)?;
            lifecycle::finish(scrim, events)
        })
        .await
    }

    pub async fn cancel(&self, scrim_id: &str, actor_id: &str) -> ScrimResult<()> {
        self.mutate(scrim_id, "cancel", |scrim, events, _now| {
            roles::ensure_organizer(scrim, actor_id)?;
            lifecycle::cancel(scrim, events)
        })
        .await
    }

    // ── Internal ───────────────────────────────────────────────────

    /// Run `op` on a working copy under the scrim's lock; commit on success.
    async fn mutate<T, F>(&self, scrim_id: &str, op: &'static str, f: F) -> ScrimResult<T>
    where
        F: FnOnce(&mut Scrim, &mut Vec<ScrimEvent>, u64) -> ScrimResult<T>,
    {
        let lock = self.lock_for(scrim_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.commit(scrim_id, op, f)
        };
        self.release(scrim_id, lock).await;
        result
    }

    /// Load, apply, save, notify. Caller holds the scrim's lock.
    fn commit<T, F>(&self, scrim_id: &str, op: &'static str, f: F) -> ScrimResult<T>
    where
        F: FnOnce(&mut Scrim, &mut Vec<ScrimEvent>, u64) -> ScrimResult<T>,
    {
        let mut scrim = self.load(scrim_id)?;
        let mut events = Vec::new();
        let now = epoch_secs();

        let output = match f(&mut scrim, &mut events, now) {
            Ok(output) => output,
            Err(e) => {
                debug!(scrim = %scrim_id, op, error = %e, "operation refused");
                return Err(e);
            }
        };

        scrim.updated_at = now;
        self.store.save_scrim(&scrim)?;
        debug!(scrim = %scrim_id, op, events = events.len(), "scrim saved");

        for event in &events {
            self.sink.notify(event);
        }
        Ok(output)
    }

    fn load(&self, scrim_id: &str) -> ScrimResult<Scrim> {
        self.store
            .find_scrim(scrim_id)?
            .ok_or_else(|| ScrimError::NotFound(format!("scrim {scrim_id}")))
    }

    async fn lock_for(&self, scrim_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(scrim_id) {
                return lock.clone();
            }
        }
        let mut locks = self.locks.write().await;
        locks.entry(scrim_id.to_string()).or_default().clone()
    }

    /// Drop the scrim's lock entry once no other caller holds or awaits it.
    ///
    /// Handles are only cloned out of the table under its lock, so a count of
    /// two (table + `lock`) means nobody else can be queued on the mutex.
    async fn release(&self, scrim_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.write().await;
        let idle = locks
            .get(scrim_id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(scrim_id);
        }
    }
}

fn validate_definition(definition: &ScrimDefinition) -> ScrimResult<()> {
    if definition.id.trim().is_empty() {
        return Err(ScrimError::Validation("scrim id is required".into()));
    }
    if definition.organizer_id.trim().is_empty() {
        return Err(ScrimError::Validation("organizer id is required".into()));
    }
    let format = &definition.format;
    if format.capacity == 0 {
        return Err(ScrimError::Validation("capacity must be at least 1".into()));
    }
    if definition.rank.min > definition.rank.max {
        return Err(ScrimError::Validation(format!(
            "rank min {} is above max {}",
            definition.rank.min, definition.rank.max
        )));
    }
    if format.roles.len() > format.capacity as usize {
        return Err(ScrimError::Validation(format!(
            "{} roles declared for {} players",
            format.roles.len(),
            format.capacity
        )));
    }
    for (i, role) in format.roles.iter().enumerate() {
        if role.trim().is_empty() {
            return Err(ScrimError::Validation("role labels must not be blank".into()));
        }
        if format.roles[..i].contains(role) {
            return Err(ScrimError::Validation(format!("duplicate role {role}")));
        }
    }
    Ok(())
}
