//! Scrim lifecycle: the roster state machine.
//!
//! ```text
//! Searching ──fill──▶ LobbyFull ──all confirmed──▶ AllConfirmed ──start──▶ InProgress ──finish──▶ Finished
//!     ▲                  │
//!     └───── decline ────┘            (cancel from any non-terminal state)
//! ```
//!
//! Every state change goes through [`transition`], which is the only place
//! that can raise `InvalidTransition`.

use tracing::info;

use scrim_core::{Scrim, ScrimState};

use crate::error::{ScrimError, ScrimResult};
use crate::events::ScrimEvent;

/// Whether `from → to` is an edge of the lifecycle graph.
pub fn can_transition(from: ScrimState, to: ScrimState) -> bool {
    use ScrimState::*;
    match (from, to) {
        (Searching, LobbyFull) => true,
        (LobbyFull, AllConfirmed) => true,
        (LobbyFull, Searching) => true,
        (AllConfirmed, InProgress) => true,
        (InProgress, Finished) => true,
        (from, Cancelled) => !from.is_terminal(),
        _ => false,
    }
}

/// Move `scrim` to `to`, recording the change.
pub fn transition(
    scrim: &mut Scrim,
    to: ScrimState,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<()> {
    let from = scrim.state;
    if !can_transition(from, to) {
        return Err(ScrimError::InvalidTransition { from, attempted: to });
    }

    scrim.state = to;
    info!(scrim = %scrim.id, %from, %to, "scrim state changed");
    events.push(ScrimEvent::StateChanged {
        scrim_id: scrim.id.clone(),
        from,
        to,
    });
    Ok(())
}

/// Organizer kicks off a fully confirmed scrim.
pub fn start(scrim: &mut Scrim, events: &mut Vec<ScrimEvent>) -> ScrimResult<()> {
    transition(scrim, ScrimState::InProgress, events)
}

/// Organizer closes a scrim in progress.
pub fn finish(scrim: &mut Scrim, events: &mut Vec<ScrimEvent>) -> ScrimResult<()> {
    transition(scrim, ScrimState::Finished, events)
}

/// Organizer calls the scrim off. Irreversible.
pub fn cancel(scrim: &mut Scrim, events: &mut Vec<ScrimEvent>) -> ScrimResult<()> {
    transition(scrim, ScrimState::Cancelled, events)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use scrim_core::{AdmissionConstraints, GameFormat, RankRange, RoleWorkspace, StrategyKind};

    pub(crate) fn test_scrim(capacity: u32) -> Scrim {
        Scrim {
            id: "scrim-1".to_string(),
            format: GameFormat {
                name: "test".to_string(),
                capacity,
                roles: Vec::new(),
            },
            scheduled_at: 5000,
            constraints: AdmissionConstraints {
                rank: RankRange::new(10, 20),
                max_latency_ms: 50,
            },
            strategy: StrategyKind::RankProximity,
            organizer_id: "org".to_string(),
            state: ScrimState::Searching,
            postulations: Vec::new(),
            confirmations: Vec::new(),
            workspace: RoleWorkspace::default(),
            created_at: 1000,
            updated_at: 1000,
        }
    }

    const ALL_STATES: [ScrimState; 6] = [
        ScrimState::Searching,
        ScrimState::LobbyFull,
        ScrimState::AllConfirmed,
        ScrimState::InProgress,
        ScrimState::Finished,
        ScrimState::Cancelled,
    ];

    #[test]
    fn forward_path_to_finished() {
        let mut scrim = test_scrim(2);
        let mut events = Vec::new();

        transition(&mut scrim, ScrimState::LobbyFull, &mut events).unwrap();
        transition(&mut scrim, ScrimState::AllConfirmed, &mut events).unwrap();
        start(&mut scrim, &mut events).unwrap();
        finish(&mut scrim, &mut events).unwrap();

        assert_eq!(scrim.state, ScrimState::Finished);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn start_requires_all_confirmed() {
        let mut scrim = test_scrim(2);
        let mut events = Vec::new();

        let err = start(&mut scrim, &mut events).unwrap_err();
        assert!(matches!(
            err,
            ScrimError::InvalidTransition {
                from: ScrimState::Searching,
                attempted: ScrimState::InProgress
            }
        ));
        assert_eq!(scrim.state, ScrimState::Searching);
        assert!(events.is_empty());
    }

    #[test]
    fn cancel_from_every_non_terminal_state() {
        for state in ALL_STATES {
            let mut scrim = test_scrim(2);
            scrim.state = state;
            let result = cancel(&mut scrim, &mut Vec::new());
            if state.is_terminal() {
                assert!(matches!(result, Err(ScrimError::InvalidTransition { .. })));
                assert_eq!(scrim.state, state);
            } else {
                assert!(result.is_ok(), "cancel from {state} should succeed");
                assert_eq!(scrim.state, ScrimState::Cancelled);
            }
        }
    }

    #[test]
    fn lobby_full_can_reopen_but_nothing_else_goes_back() {
        assert!(can_transition(ScrimState::LobbyFull, ScrimState::Searching));
        assert!(!can_transition(ScrimState::AllConfirmed, ScrimState::Searching));
        assert!(!can_transition(ScrimState::InProgress, ScrimState::AllConfirmed));
        assert!(!can_transition(ScrimState::Finished, ScrimState::InProgress));
        assert!(!can_transition(ScrimState::Cancelled, ScrimState::Searching));
        assert!(!can_transition(ScrimState::Searching, ScrimState::AllConfirmed));
    }

    #[test]
    fn no_self_transitions() {
        for state in ALL_STATES {
            assert!(!can_transition(state, state), "{state} -> {state}");
        }
    }
}
