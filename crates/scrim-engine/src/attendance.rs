//! Confirmation engine: attendance once the roster is full.
//!
//! Each accepted applicant gets exactly one confirmation request and may
//! answer it exactly once. A decline frees the slot: the applicant's
//! postulation is rejected and a full lobby reopens. Players who already
//! confirmed keep their confirmation across the reopen.

use tracing::{debug, info};

use scrim_core::{Confirmation, ConfirmationStatus, PostulationStatus, Scrim, ScrimState};

use crate::error::{ScrimError, ScrimResult};
use crate::events::ScrimEvent;
use crate::lifecycle;

/// Reason recorded on the postulation of an applicant who declined.
pub const DECLINED_REASON: &str = "attendance declined";

/// Create a Pending confirmation for every accepted applicant without one.
///
/// Returns how many were created. Calling it again creates none.
pub fn spawn_confirmations(scrim: &mut Scrim, now: u64, events: &mut Vec<ScrimEvent>) -> usize {
    let missing: Vec<String> = scrim
        .postulations
        .iter()
        .filter(|p| p.is_accepted())
        .filter(|p| scrim.confirmation(&p.applicant_id).is_none())
        .map(|p| p.applicant_id.clone())
        .collect();

    for applicant_id in &missing {
        scrim.confirmations.push(Confirmation::pending(applicant_id, now));
        events.push(ScrimEvent::ConfirmationChanged {
            scrim_id: scrim.id.clone(),
            applicant_id: applicant_id.clone(),
            status: ConfirmationStatus::Pending,
        });
    }

    if !missing.is_empty() {
        debug!(scrim = %scrim.id, requested = missing.len(), "attendance requested");
    }
    missing.len()
}

/// Advance a full lobby once nobody is left to answer.
pub fn check_all_confirmed(scrim: &mut Scrim, events: &mut Vec<ScrimEvent>) -> ScrimResult<()> {
    if scrim.state == ScrimState::LobbyFull && scrim.all_confirmed() {
        lifecycle::transition(scrim, ScrimState::AllConfirmed, events)?;
    }
    Ok(())
}

/// The applicant will attend.
pub fn confirm(
    scrim: &mut Scrim,
    applicant_id: &str,
    now: u64,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<()> {
    ensure_answerable(scrim, applicant_id)?;

    if let Some(confirmation) = scrim.confirmation_mut(applicant_id) {
        confirmation.status = ConfirmationStatus::Confirmed;
        confirmation.responded_at = Some(now);
    }
    events.push(ScrimEvent::ConfirmationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: ConfirmationStatus::Confirmed,
    });
    info!(
        scrim = %scrim.id,
        applicant = %applicant_id,
        pending = scrim.pending_confirmation_count(),
        "attendance confirmed"
    );

    check_all_confirmed(scrim, events)
}

/// The applicant will not attend; their slot opens up again.
pub fn decline(
    scrim: &mut Scrim,
    applicant_id: &str,
    now: u64,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<()> {
    ensure_answerable(scrim, applicant_id)?;

    if let Some(confirmation) = scrim.confirmation_mut(applicant_id) {
        confirmation.status = ConfirmationStatus::Rejected;
        confirmation.responded_at = Some(now);
    }
    events.push(ScrimEvent::ConfirmationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: ConfirmationStatus::Rejected,
    });

    if let Some(postulation) = scrim.postulation_mut(applicant_id) {
        postulation.status = PostulationStatus::Rejected;
        postulation.rejection_reason = Some(DECLINED_REASON.to_string());
        postulation.decided_at = Some(now);
    }
    events.push(ScrimEvent::PostulationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: PostulationStatus::Rejected,
        reason: Some(DECLINED_REASON.to_string()),
    });
    info!(scrim = %scrim.id, applicant = %applicant_id, "attendance declined, slot freed");

    if scrim.state == ScrimState::LobbyFull {
        lifecycle::transition(scrim, ScrimState::Searching, events)?;
    }
    Ok(())
}

/// A confirmation exists, is still Pending, and the scrim still takes answers.
fn ensure_answerable(scrim: &Scrim, applicant_id: &str) -> ScrimResult<()> {
    let confirmation = scrim.confirmation(applicant_id).ok_or_else(|| {
        ScrimError::NotFound(format!("confirmation for {applicant_id} in scrim {}", scrim.id))
    })?;

    if confirmation.status != ConfirmationStatus::Pending {
        return Err(ScrimError::InvalidState(format!(
            "confirmation for {applicant_id} is already {}",
            confirmation.status
        )));
    }

    match scrim.state {
        ScrimState::Searching | ScrimState::LobbyFull => Ok(()),
        state => Err(ScrimError::InvalidState(format!(
            "scrim {} is {state}, attendance is closed",
            scrim.id
        ))),
    }
}
