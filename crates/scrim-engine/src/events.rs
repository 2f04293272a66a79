//! Scrim events and the sinks that receive them.
//!
//! Events are collected while an operation mutates its working copy and are
//! handed to the sink only after the store accepted the new state. Sinks
//! are fire-and-forget: they cannot fail the operation.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use scrim_core::{ConfirmationStatus, PostulationStatus, ScrimId, ScrimState, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrimEvent {
    ScrimCreated {
        scrim_id: ScrimId,
        organizer_id: UserId,
    },
    StateChanged {
        scrim_id: ScrimId,
        from: ScrimState,
        to: ScrimState,
    },
    PostulationChanged {
        scrim_id: ScrimId,
        applicant_id: UserId,
        status: PostulationStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    ConfirmationChanged {
        scrim_id: ScrimId,
        applicant_id: UserId,
        status: ConfirmationStatus,
    },
    RolesFinalized {
        scrim_id: ScrimId,
        assigned: usize,
        unmatched: usize,
    },
}

impl ScrimEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScrimCreated { .. } => "scrim.created",
            Self::StateChanged { .. } => "scrim.state_changed",
            Self::PostulationChanged { .. } => "postulation.changed",
            Self::ConfirmationChanged { .. } => "confirmation.changed",
            Self::RolesFinalized { .. } => "roles.finalized",
        }
    }

    pub fn scrim_id(&self) -> &str {
        match self {
            Self::ScrimCreated { scrim_id, .. }
            | Self::StateChanged { scrim_id, .. }
            | Self::PostulationChanged { scrim_id, .. }
            | Self::ConfirmationChanged { scrim_id, .. }
            | Self::RolesFinalized { scrim_id, .. } => scrim_id,
        }
    }
}

/// Receiver of scrim events. Delivery and formatting are the sink's concern.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &ScrimEvent);
}

/// Writes every event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &ScrimEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(event = event.as_str(), scrim = %event.scrim_id(), %payload, "scrim event");
    }
}

/// Keeps events in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ScrimEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every event received so far.
    pub fn drain(&self) -> Vec<ScrimEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventSink for MemorySink {
    fn notify(&self, event: &ScrimEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
