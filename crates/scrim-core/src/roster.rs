//! Role-assignment workspace: the organizer's editable roster.
//!
//! Every successful edit pushes an [`ActionRecord`] carrying enough of the
//! prior state to invert itself; `undo` pops the newest record and applies
//! the inverse. `finalize` locks the workspace and hands the chosen roles
//! over to the matching Pending attendance confirmations. It never touches
//! the scrim lifecycle.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{Confirmation, ConfirmationStatus, UserId};

/// Default depth of the undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("workspace is locked")]
    Locked,

    #[error("nothing to undo")]
    EmptyHistory,

    #[error("participant not found: {0}")]
    ParticipantNotFound(UserId),

    #[error("participant already present: {0}")]
    AlreadyPresent(UserId),

    #[error("role {role} is already held by {holder}")]
    RoleTaken { role: String, holder: UserId },

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// A player on the working roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub role: Option<String>,
}

/// One reversible workspace edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRecord {
    Invite {
        user_id: UserId,
        role: Option<String>,
    },
    AssignRole {
        user_id: UserId,
        previous_role: Option<String>,
        new_role: String,
    },
    Swap {
        first: UserId,
        second: UserId,
    },
}

impl ActionRecord {
    pub fn label(&self) -> &'static str {
        match self {
            ActionRecord::Invite { .. } => "invite",
            ActionRecord::AssignRole { .. } => "assign_role",
            ActionRecord::Swap { .. } => "swap",
        }
    }
}

/// Outcome of handing roles over to confirmations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// (applicant, role) pairs written into Pending confirmations.
    pub assigned: Vec<(UserId, String)>,
    /// Participants with a role but no Pending confirmation.
    pub unmatched: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleWorkspace {
    /// Role labels accepted by `invite`/`assign_role`; empty means any.
    allowed_roles: Vec<String>,
    participants: Vec<Participant>,
    history: VecDeque<ActionRecord>,
    history_limit: usize,
    locked: bool,
}

impl Default for RoleWorkspace {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_HISTORY_LIMIT)
    }
}

impl RoleWorkspace {
    pub fn new(allowed_roles: Vec<String>, history_limit: usize) -> Self {
        Self {
            allowed_roles,
            participants: Vec::new(),
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            locked: false,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn history(&self) -> impl Iterator<Item = &ActionRecord> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Who currently holds `role`, if anyone.
    pub fn role_holder(&self, role: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.role.as_deref() == Some(role))
            .map(|p| p.user_id.as_str())
    }

    /// Add a player to the roster, optionally with a role.
    pub fn invite(&mut self, user_id: &str, role: Option<&str>) -> Result<(), WorkspaceError> {
        self.ensure_unlocked()?;
        if self.participant(user_id).is_some() {
            return Err(WorkspaceError::AlreadyPresent(user_id.to_string()));
        }
        if let Some(role) = role {
            self.ensure_role_free(role, user_id)?;
        }

        self.participants.push(Participant {
            user_id: user_id.to_string(),
            role: role.map(str::to_string),
        });
        self.record(ActionRecord::Invite {
            user_id: user_id.to_string(),
            role: role.map(str::to_string),
        });
        debug!(participant = %user_id, ?role, "participant invited");
        Ok(())
    }

    /// Give `user_id` a new role.
    pub fn assign_role(&mut self, user_id: &str, role: &str) -> Result<(), WorkspaceError> {
        self.ensure_unlocked()?;
        self.ensure_role_free(role, user_id)?;
        let participant = self
            .participant_mut(user_id)
            .ok_or_else(|| WorkspaceError::ParticipantNotFound(user_id.to_string()))?;

        let previous_role = participant.role.replace(role.to_string());
        self.record(ActionRecord::AssignRole {
            user_id: user_id.to_string(),
            previous_role,
            new_role: role.to_string(),
        });
        debug!(participant = %user_id, %role, "role assigned");
        Ok(())
    }

    /// Exchange the roles of two participants.
    pub fn swap(&mut self, first: &str, second: &str) -> Result<(), WorkspaceError> {
        self.ensure_unlocked()?;
        for user_id in [first, second] {
            if self.participant(user_id).is_none() {
                return Err(WorkspaceError::ParticipantNotFound(user_id.to_string()));
            }
        }

        self.exchange_roles(first, second);
        self.record(ActionRecord::Swap {
            first: first.to_string(),
            second: second.to_string(),
        });
        debug!(%first, %second, "roles swapped");
        Ok(())
    }

    /// Revert the most recent edit.
    pub fn undo(&mut self) -> Result<ActionRecord, WorkspaceError> {
        self.ensure_unlocked()?;
        let action = self.history.pop_back().ok_or(WorkspaceError::EmptyHistory)?;

        match &action {
            ActionRecord::Invite { user_id, .. } => {
                self.participants.retain(|p| &p.user_id != user_id);
            }
            ActionRecord::AssignRole {
                user_id,
                previous_role,
                ..
            } => {
                if let Some(participant) = self.participant_mut(user_id) {
                    participant.role = previous_role.clone();
                }
            }
            ActionRecord::Swap { first, second } => self.exchange_roles(first, second),
        }

        debug!(action = action.label(), remaining = self.history.len(), "undo applied");
        Ok(action)
    }

    /// Lock the workspace and write roles into Pending confirmations.
    ///
    /// The working roster is discarded afterwards; the report and the
    /// confirmations are the record of the hand-off. A participant without a
    /// Pending confirmation is skipped. A second call fails with `Locked` and
    /// changes nothing.
    pub fn finalize(
        &mut self,
        confirmations: &mut [Confirmation],
    ) -> Result<FinalizeReport, WorkspaceError> {
        self.ensure_unlocked()?;
        self.locked = true;
        self.history.clear();

        let mut report = FinalizeReport::default();
        for participant in std::mem::take(&mut self.participants) {
            let Some(role) = participant.role else {
                continue;
            };
            let target = confirmations.iter_mut().find(|c| {
                c.applicant_id == participant.user_id && c.status == ConfirmationStatus::Pending
            });
            match target {
                Some(confirmation) => {
                    confirmation.role = Some(role.clone());
                    report.assigned.push((participant.user_id, role));
                }
                None => {
                    warn!(
                        participant = %participant.user_id,
                        %role,
                        "no pending confirmation for participant, role not handed over"
                    );
                    report.unmatched.push(participant.user_id);
                }
            }
        }

        info!(
            assigned = report.assigned.len(),
            unmatched = report.unmatched.len(),
            "workspace finalized"
        );
        Ok(report)
    }

    fn ensure_unlocked(&self) -> Result<(), WorkspaceError> {
        if self.locked {
            return Err(WorkspaceError::Locked);
        }
        Ok(())
    }

    fn ensure_role_free(&self, role: &str, user_id: &str) -> Result<(), WorkspaceError> {
        if !self.allowed_roles.is_empty() && !self.allowed_roles.iter().any(|r| r == role) {
            return Err(WorkspaceError::UnknownRole(role.to_string()));
        }
        match self.role_holder(role) {
            Some(holder) if holder != user_id => Err(WorkspaceError::RoleTaken {
                role: role.to_string(),
                holder: holder.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn participant_mut(&mut self, user_id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user_id == user_id)
    }

    fn exchange_roles(&mut self, first: &str, second: &str) {
        let first_role = self.participant(first).and_then(|p| p.role.clone());
        let second_role = self.participant(second).and_then(|p| p.role.clone());
        if let Some(p) = self.participant_mut(first) {
            p.role = second_role;
        }
        if let Some(p) = self.participant_mut(second) {
            p.role = first_role;
        }
    }

    fn record(&mut self, action: ActionRecord) {
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_workspace() -> RoleWorkspace {
        RoleWorkspace::new(
            vec!["entry".into(), "support".into(), "awp".into()],
            DEFAULT_HISTORY_LIMIT,
        )
    }

    fn roles(ws: &RoleWorkspace) -> Vec<(String, Option<String>)> {
        ws.participants()
            .iter()
            .map(|p| (p.user_id.clone(), p.role.clone()))
            .collect()
    }

    #[test]
    fn invite_rejects_duplicates_and_taken_roles() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();

        assert_eq!(
            ws.invite("alice", Some("support")),
            Err(WorkspaceError::AlreadyPresent("alice".into()))
        );
        assert_eq!(
            ws.invite("bob", Some("entry")),
            Err(WorkspaceError::RoleTaken {
                role: "entry".into(),
                holder: "alice".into()
            })
        );
        assert_eq!(
            ws.invite("bob", Some("coach")),
            Err(WorkspaceError::UnknownRole("coach".into()))
        );
        assert_eq!(ws.participants().len(), 1);
        assert_eq!(ws.history_len(), 1);
    }

    #[test]
    fn assign_role_requires_participant_and_free_role() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();
        ws.invite("bob", None).unwrap();

        assert!(matches!(
            ws.assign_role("carol", "awp"),
            Err(WorkspaceError::ParticipantNotFound(_))
        ));
        assert!(matches!(
            ws.assign_role("bob", "entry"),
            Err(WorkspaceError::RoleTaken { .. })
        ));

        ws.assign_role("bob", "awp").unwrap();
        assert_eq!(ws.role_holder("awp"), Some("bob"));
        // Re-assigning a role the participant already holds is allowed.
        ws.assign_role("bob", "awp").unwrap();
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();
        ws.invite("bob", Some("support")).unwrap();

        ws.swap("alice", "bob").unwrap();
        assert_eq!(ws.role_holder("entry"), Some("bob"));
        assert_eq!(ws.role_holder("support"), Some("alice"));

        assert!(matches!(
            ws.swap("alice", "ghost"),
            Err(WorkspaceError::ParticipantNotFound(_))
        ));
    }

    #[test]
    fn undo_walks_back_every_step() {
        let mut ws = test_workspace();
        let mut snapshots = vec![roles(&ws)];

        ws.invite("alice", Some("entry")).unwrap();
        snapshots.push(roles(&ws));
        ws.invite("bob", None).unwrap();
        snapshots.push(roles(&ws));
        ws.assign_role("bob", "support").unwrap();
        snapshots.push(roles(&ws));
        ws.swap("alice", "bob").unwrap();
        snapshots.push(roles(&ws));
        ws.assign_role("alice", "awp").unwrap();
        snapshots.push(roles(&ws));
        ws.invite("carol", Some("entry")).unwrap_err();

        // Pop the current state, then each undo must land on the previous one.
        snapshots.pop();
        while let Some(expected) = snapshots.pop() {
            ws.undo().unwrap();
            assert_eq!(roles(&ws), expected);
        }
        assert_eq!(ws.undo(), Err(WorkspaceError::EmptyHistory));
    }

    #[test]
    fn undo_reverses_assign_after_swap_of_roleless_players() {
        let mut ws = test_workspace();
        let mut snapshots = vec![roles(&ws)];

        ws.invite("alice", None).unwrap();
        snapshots.push(roles(&ws));
        ws.invite("bob", None).unwrap();
        snapshots.push(roles(&ws));
        ws.swap("alice", "bob").unwrap();
        snapshots.push(roles(&ws));
        ws.invite("carol", Some("awp")).unwrap();
        snapshots.push(roles(&ws));
        ws.assign_role("bob", "entry").unwrap();
        snapshots.push(roles(&ws));
        ws.swap("bob", "carol").unwrap();
        snapshots.push(roles(&ws));
        ws.assign_role("alice", "entry").unwrap_err();
        ws.assign_role("bob", "support").unwrap();
        snapshots.push(roles(&ws));

        assert_eq!(ws.role_holder("support"), Some("bob"));
        assert_eq!(ws.role_holder("entry"), Some("carol"));

        snapshots.pop();
        while let Some(expected) = snapshots.pop() {
            ws.undo().unwrap();
            assert_eq!(roles(&ws), expected);
        }
        assert!(ws.participants().is_empty());
        assert_eq!(ws.undo(), Err(WorkspaceError::EmptyHistory));
    }

    #[test]
    fn history_is_bounded() {
        let mut ws = RoleWorkspace::new(Vec::new(), 2);
        ws.invite("a", None).unwrap();
        ws.invite("b", None).unwrap();
        ws.invite("c", None).unwrap();

        assert_eq!(ws.history_len(), 2);
        ws.undo().unwrap();
        ws.undo().unwrap();
        assert_eq!(ws.undo(), Err(WorkspaceError::EmptyHistory));
        // The oldest invite fell off the stack and stays applied.
        assert_eq!(ws.participants().len(), 1);
    }

    #[test]
    fn finalize_hands_roles_to_pending_confirmations() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();
        ws.invite("bob", Some("support")).unwrap();
        ws.invite("carol", None).unwrap();
        ws.invite("dave", Some("awp")).unwrap();

        let mut confirmations = vec![
            Confirmation::pending("alice", 10),
            Confirmation::pending("bob", 10),
            Confirmation::pending("carol", 10),
        ];
        confirmations[1].status = ConfirmationStatus::Confirmed;

        let report = ws.finalize(&mut confirmations).unwrap();

        assert_eq!(report.assigned, vec![("alice".to_string(), "entry".to_string())]);
        assert_eq!(report.unmatched, vec!["bob".to_string(), "dave".to_string()]);
        assert_eq!(confirmations[0].role.as_deref(), Some("entry"));
        assert_eq!(confirmations[1].role, None);
        assert_eq!(confirmations[2].role, None);
        assert!(ws.participants().is_empty());
        assert!(ws.role_holder("entry").is_none());
        assert!(ws.is_locked());
    }

    #[test]
    fn finalize_twice_is_locked_and_changes_nothing() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();
        let mut confirmations = vec![Confirmation::pending("alice", 10)];
        ws.finalize(&mut confirmations).unwrap();

        confirmations[0].role = None;
        let before = ws.clone();
        assert_eq!(ws.finalize(&mut confirmations), Err(WorkspaceError::Locked));
        assert_eq!(ws, before);
        assert_eq!(confirmations[0].role, None);

        assert_eq!(ws.invite("bob", None), Err(WorkspaceError::Locked));
        assert_eq!(ws.assign_role("alice", "awp"), Err(WorkspaceError::Locked));
        assert_eq!(ws.swap("alice", "alice"), Err(WorkspaceError::Locked));
        assert_eq!(ws.undo(), Err(WorkspaceError::Locked));
    }

    #[test]
    fn serializes_with_history() {
        let mut ws = test_workspace();
        ws.invite("alice", Some("entry")).unwrap();
        ws.swap("alice", "alice").unwrap();

        let json = serde_json::to_string(&ws).unwrap();
        assert!(json.contains("\"action\":\"invite\""));
        let mut back: RoleWorkspace = serde_json::from_str(&json).unwrap();
        assert_eq!(back.undo().unwrap().label(), "swap");
    }
}
