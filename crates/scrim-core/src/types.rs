//! Domain types for scrim formation.
//!
//! A `Scrim` is the aggregate root: it owns its postulations, its
//! attendance confirmations, and the organizer's role-assignment workspace.
//! Everything here is serializable so the whole aggregate can be stored as
//! a single JSON value.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::roster::RoleWorkspace;

/// Unique identifier for a scrim.
pub type ScrimId = String;

/// Unique identifier for a player or organizer.
pub type UserId = String;

/// Current Unix time in seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ── Lifecycle ──────────────────────────────────────────────────────

/// Lifecycle state of a scrim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrimState {
    /// Accepting postulations.
    Searching,
    /// Roster full, waiting for attendance confirmations.
    LobbyFull,
    /// Every active confirmation is Confirmed.
    AllConfirmed,
    /// Match being played.
    InProgress,
    /// Match over.
    Finished,
    /// Cancelled by the organizer.
    Cancelled,
}

impl ScrimState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScrimState::Finished | ScrimState::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScrimState::Searching => "searching",
            ScrimState::LobbyFull => "lobby_full",
            ScrimState::AllConfirmed => "all_confirmed",
            ScrimState::InProgress => "in_progress",
            ScrimState::Finished => "finished",
            ScrimState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScrimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Format & constraints ───────────────────────────────────────────

/// Game/format descriptor: how many players and which roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameFormat {
    pub name: String,
    /// Players needed to fill the roster.
    pub capacity: u32,
    /// Role labels the organizer assigns (e.g. "entry", "support").
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Inclusive rank window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankRange {
    pub min: u32,
    pub max: u32,
}

impl RankRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rank: u32) -> bool {
        rank >= self.min && rank <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min) + f64::from(self.max)) / 2.0
    }

    /// Absolute distance of `rank` from the middle of the window.
    pub fn distance_from_midpoint(&self, rank: u32) -> f64 {
        (f64::from(rank) - self.midpoint()).abs()
    }

    /// Distance to the closest edge, or `None` if outside the window.
    pub fn edge_distance(&self, rank: u32) -> Option<u32> {
        self.contains(rank)
            .then(|| (rank - self.min).min(self.max - rank))
    }
}

/// Hard admission limits for a scrim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdmissionConstraints {
    pub rank: RankRange,
    pub max_latency_ms: u32,
}

/// Identifier of the candidate-selection strategy a scrim uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    RankProximity,
    Latency,
    Reliability,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RankProximity => "rank_proximity",
            StrategyKind::Latency => "latency",
            StrategyKind::Reliability => "reliability",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank_proximity" | "rank" => Ok(StrategyKind::RankProximity),
            "latency" => Ok(StrategyKind::Latency),
            "reliability" => Ok(StrategyKind::Reliability),
            other => Err(format!("unknown selection strategy: {other}")),
        }
    }
}

// ── Postulation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostulationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for PostulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostulationStatus::Pending => "pending",
            PostulationStatus::Accepted => "accepted",
            PostulationStatus::Rejected => "rejected",
        })
    }
}

/// A player's application to join a scrim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Postulation {
    pub applicant_id: UserId,
    pub rank: u32,
    pub latency_ms: u32,
    pub status: PostulationStatus,
    pub rejection_reason: Option<String>,
    /// Unix timestamp (seconds) of submission.
    pub submitted_at: u64,
    /// Unix timestamp (seconds) of the last status change.
    pub decided_at: Option<u64>,
}

impl Postulation {
    pub fn new(applicant_id: &str, rank: u32, latency_ms: u32, now: u64) -> Self {
        Self {
            applicant_id: applicant_id.to_string(),
            rank,
            latency_ms,
            status: PostulationStatus::Pending,
            rejection_reason: None,
            submitted_at: now,
            decided_at: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == PostulationStatus::Accepted
    }

    pub fn is_pending(&self) -> bool {
        self.status == PostulationStatus::Pending
    }
}

// ── Confirmation ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfirmationStatus::Pending => "pending",
            ConfirmationStatus::Confirmed => "confirmed",
            ConfirmationStatus::Rejected => "rejected",
        })
    }
}

/// Attendance acknowledgment for an accepted applicant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub applicant_id: UserId,
    pub status: ConfirmationStatus,
    /// Role handed over from the role-assignment workspace.
    pub role: Option<String>,
    pub requested_at: u64,
    pub responded_at: Option<u64>,
}

impl Confirmation {
    pub fn pending(applicant_id: &str, now: u64) -> Self {
        Self {
            applicant_id: applicant_id.to_string(),
            status: ConfirmationStatus::Pending,
            role: None,
            requested_at: now,
            responded_at: None,
        }
    }

    /// Rejected confirmations no longer hold a slot.
    pub fn is_active(&self) -> bool {
        self.status != ConfirmationStatus::Rejected
    }
}

// ── Candidate ──────────────────────────────────────────────────────

/// A player profile as seen by candidate selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub user_id: UserId,
    pub rank: u32,
    pub latency_ms: u32,
    /// Share of past matches without fair-play reports (0.0..=1.0).
    pub fair_play_rate: f64,
    /// Share of past matches abandoned (0.0..=1.0).
    pub abandon_rate: f64,
    #[serde(default)]
    pub preferred_role: Option<String>,
}

// ── Scrim ──────────────────────────────────────────────────────────

/// The scrim aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scrim {
    pub id: ScrimId,
    pub format: GameFormat,
    /// Unix timestamp (seconds) the match is scheduled for.
    pub scheduled_at: u64,
    pub constraints: AdmissionConstraints,
    pub strategy: StrategyKind,
    pub organizer_id: UserId,
    pub state: ScrimState,
    /// Postulations in submission order.
    pub postulations: Vec<Postulation>,
    pub confirmations: Vec<Confirmation>,
    pub workspace: RoleWorkspace,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Scrim {
    pub fn capacity(&self) -> u32 {
        self.format.capacity
    }

    pub fn is_organizer(&self, user_id: &str) -> bool {
        self.organizer_id == user_id
    }

    /// Number of postulations currently holding a slot.
    pub fn accepted_count(&self) -> u32 {
        self.postulations.iter().filter(|p| p.is_accepted()).count() as u32
    }

    pub fn is_full(&self) -> bool {
        self.accepted_count() >= self.capacity()
    }

    pub fn postulation(&self, applicant_id: &str) -> Option<&Postulation> {
        self.postulations
            .iter()
            .find(|p| p.applicant_id == applicant_id)
    }

    pub fn postulation_mut(&mut self, applicant_id: &str) -> Option<&mut Postulation> {
        self.postulations
            .iter_mut()
            .find(|p| p.applicant_id == applicant_id)
    }

    pub fn confirmation(&self, applicant_id: &str) -> Option<&Confirmation> {
        self.confirmations
            .iter()
            .find(|c| c.applicant_id == applicant_id)
    }

    pub fn confirmation_mut(&mut self, applicant_id: &str) -> Option<&mut Confirmation> {
        self.confirmations
            .iter_mut()
            .find(|c| c.applicant_id == applicant_id)
    }

    /// Confirmations that still hold a slot (Pending or Confirmed).
    pub fn active_confirmations(&self) -> impl Iterator<Item = &Confirmation> {
        self.confirmations.iter().filter(|c| c.is_active())
    }

    pub fn pending_confirmation_count(&self) -> usize {
        self.confirmations
            .iter()
            .filter(|c| c.status == ConfirmationStatus::Pending)
            .count()
    }

    /// True when at least one confirmation is active and none is Pending.
    pub fn all_confirmed(&self) -> bool {
        let mut active = self.active_confirmations().peekable();
        active.peek().is_some()
            && active.all(|c| c.status == ConfirmationStatus::Confirmed)
    }

    /// Storage key.
    pub fn table_key(&self) -> String {
        self.id.clone()
    }
}
