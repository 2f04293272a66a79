//! Organizer-facing role workspace operations.
//!
//! Thin guards around [`RoleWorkspace`]: only the organizer may edit, and
//! finalizing hands roles over to the Pending confirmations without touching
//! the scrim lifecycle.

use tracing::info;

use scrim_core::{ActionRecord, FinalizeReport, Scrim};

use crate::error::{ScrimError, ScrimResult};
use crate::events::ScrimEvent;

pub fn invite(
    scrim: &mut Scrim,
    actor_id: &str,
    user_id: &str,
    role: Option<&str>,
) -> ScrimResult<()> {
    ensure_organizer(scrim, actor_id)?;
    ensure_id(user_id)?;
    scrim.workspace.invite(user_id, role)?;
    Ok(())
}

pub fn assign_role(scrim: &mut Scrim, actor_id: &str, user_id: &str, role: &str) -> ScrimResult<()> {
    ensure_organizer(scrim, actor_id)?;
    if role.trim().is_empty() {
        return Err(ScrimError::Validation("role is required".into()));
    }
    scrim.workspace.assign_role(user_id, role)?;
    Ok(())
}

pub fn swap(scrim: &mut Scrim, actor_id: &str, first: &str, second: &str) -> ScrimResult<()> {
    ensure_organizer(scrim, actor_id)?;
    if first == second {
        return Err(ScrimError::Validation(format!("cannot swap {first} with itself")));
    }
    scrim.workspace.swap(first, second)?;
    Ok(())
}

pub fn undo(scrim: &mut Scrim, actor_id: &str) -> ScrimResult<ActionRecord> {
    ensure_organizer(scrim, actor_id)?;
    Ok(scrim.workspace.undo()?)
}

/// Lock the workspace and hand roles to the matching Pending confirmations.
pub fn finalize(
    scrim: &mut Scrim,
    actor_id: &str,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<FinalizeReport> {
    ensure_organizer(scrim, actor_id)?;
    let report = scrim.workspace.finalize(&mut scrim.confirmations)?;

    info!(
        scrim = %scrim.id,
        assigned = report.assigned.len(),
        unmatched = report.unmatched.len(),
        "roles finalized"
    );
    events.push(ScrimEvent::RolesFinalized {
        scrim_id: scrim.id.clone(),
        assigned: report.assigned.len(),
        unmatched: report.unmatched.len(),
    });
    Ok(report)
}

pub(crate) fn ensure_organizer(scrim: &Scrim, actor_id: &str) -> ScrimResult<()> {
    if scrim.is_organizer(actor_id) {
        Ok(())
    } else {
        Err(ScrimError::Forbidden(format!(
            "{actor_id} is not the organizer of scrim {}",
            scrim.id
        )))
    }
}

fn ensure_id(user_id: &str) -> ScrimResult<()> {
    if user_id.trim().is_empty() {
        return Err(ScrimError::Validation("user id is required".into()));
    }
    Ok(())
}
