//! Postulation evaluator.
//!
//! Applications are decided on arrival against the scrim's hard limits and
//! the configured [`AdmissionPolicy`]:
//!
//! 1. Rank outside the window or latency above the max → Rejected.
//! 2. A review rule applies → Pending, for the organizer to decide.
//! 3. Otherwise → Accepted, or Rejected as "scrim full" when no slot is left.
//!
//! Every path that can add an accepted applicant ends in [`check_fill`].

use tracing::{debug, info};

use scrim_core::config::AdmissionPolicy;
use scrim_core::{AdmissionConstraints, Postulation, PostulationStatus, Scrim, ScrimState};

use crate::attendance;
use crate::error::{ScrimError, ScrimResult};
use crate::events::ScrimEvent;
use crate::lifecycle;

pub const FULL_REASON: &str = "scrim full";
pub const ORGANIZER_REJECT_REASON: &str = "rejected by organizer";

/// Outcome of evaluating one application, before capacity is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Review,
    Reject(String),
}

/// Apply the hard limits and review rules to a submitted rank and latency.
pub fn judge(
    constraints: &AdmissionConstraints,
    policy: &AdmissionPolicy,
    rank: u32,
    latency_ms: u32,
) -> Verdict {
    let range = constraints.rank;
    let Some(edge_distance) = range.edge_distance(rank) else {
        return Verdict::Reject(format!("rank {rank} outside [{}, {}]", range.min, range.max));
    };
    if latency_ms > constraints.max_latency_ms {
        return Verdict::Reject(format!(
            "latency {latency_ms}ms exceeds max {}ms",
            constraints.max_latency_ms
        ));
    }

    let latency_headroom = constraints.max_latency_ms - latency_ms;
    if policy.manual_review
        || edge_distance < policy.rank_review_margin
        || latency_headroom < policy.latency_review_margin_ms
    {
        return Verdict::Review;
    }
    Verdict::Accept
}

/// Evaluate a new application and record it on the scrim.
///
/// Precondition failures leave the scrim untouched. A rejected application
/// is still recorded, so the applicant cannot apply again.
pub fn evaluate(
    scrim: &mut Scrim,
    policy: &AdmissionPolicy,
    applicant_id: &str,
    rank: u32,
    latency_ms: u32,
    now: u64,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<Postulation> {
    if applicant_id.trim().is_empty() {
        return Err(ScrimError::Validation("applicant id is required".into()));
    }
    if scrim.state != ScrimState::Searching {
        return Err(ScrimError::InvalidState(format!(
            "scrim {} is {}, not accepting postulations",
            scrim.id, scrim.state
        )));
    }
    if scrim.is_organizer(applicant_id) {
        return Err(ScrimError::Forbidden(format!(
            "organizer {applicant_id} cannot apply to their own scrim"
        )));
    }
    if scrim.postulation(applicant_id).is_some() {
        return Err(ScrimError::Conflict(format!(
            "{applicant_id} already applied to scrim {}",
            scrim.id
        )));
    }

    let mut postulation = Postulation::new(applicant_id, rank, latency_ms, now);
    match judge(&scrim.constraints, policy, rank, latency_ms) {
        Verdict::Reject(reason) => reject(&mut postulation, reason, now),
        Verdict::Review => {}
        Verdict::Accept if scrim.is_full() => reject(&mut postulation, FULL_REASON.into(), now),
        Verdict::Accept => {
            postulation.status = PostulationStatus::Accepted;
            postulation.decided_at = Some(now);
        }
    }

    info!(
        scrim = %scrim.id,
        applicant = %applicant_id,
        rank,
        latency_ms,
        status = %postulation.status,
        reason = postulation.rejection_reason.as_deref().unwrap_or(""),
        "postulation evaluated"
    );
    events.push(ScrimEvent::PostulationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: postulation.status,
        reason: postulation.rejection_reason.clone(),
    });
    scrim.postulations.push(postulation.clone());

    check_fill(scrim, now, events)?;
    Ok(postulation)
}

/// Organizer accepts a postulation that was left for review.
pub fn accept_pending(
    scrim: &mut Scrim,
    actor_id: &str,
    applicant_id: &str,
    now: u64,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<()> {
    ensure_pending(scrim, actor_id, applicant_id)?;
    if scrim.state != ScrimState::Searching {
        return Err(ScrimError::InvalidState(format!(
            "scrim {} is {}, roster is closed",
            scrim.id, scrim.state
        )));
    }
    if scrim.is_full() {
        return Err(ScrimError::InvalidState(format!("scrim {} is full", scrim.id)));
    }

    if let Some(postulation) = scrim.postulation_mut(applicant_id) {
        postulation.status = PostulationStatus::Accepted;
        postulation.decided_at = Some(now);
    }
    info!(scrim = %scrim.id, applicant = %applicant_id, "postulation accepted by organizer");
    events.push(ScrimEvent::PostulationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: PostulationStatus::Accepted,
        reason: None,
    });

    check_fill(scrim, now, events)
}

/// Organizer rejects a postulation that was left for review.
pub fn reject_pending(
    scrim: &mut Scrim,
    actor_id: &str,
    applicant_id: &str,
    reason: &str,
    now: u64,
    events: &mut Vec<ScrimEvent>,
) -> ScrimResult<()> {
    ensure_pending(scrim, actor_id, applicant_id)?;

    let reason = match reason.trim() {
        "" => ORGANIZER_REJECT_REASON.to_string(),
        given => given.to_string(),
    };
    if let Some(postulation) = scrim.postulation_mut(applicant_id) {
        reject(postulation, reason.clone(), now);
    }
    info!(scrim = %scrim.id, applicant = %applicant_id, %reason, "postulation rejected by organizer");
    events.push(ScrimEvent::PostulationChanged {
        scrim_id: scrim.id.clone(),
        applicant_id: applicant_id.to_string(),
        status: PostulationStatus::Rejected,
        reason: Some(reason),
    });
    Ok(())
}

/// Close the roster once accepted applicants reach capacity.
///
/// Spawns one Pending confirmation per accepted applicant lacking one.
/// Safe to call repeatedly: nothing happens unless the scrim is Searching
/// and full.
pub fn check_fill(scrim: &mut Scrim, now: u64, events: &mut Vec<ScrimEvent>) -> ScrimResult<()> {
    if scrim.state != ScrimState::Searching || !scrim.is_full() {
        debug!(
            scrim = %scrim.id,
            accepted = scrim.accepted_count(),
            capacity = scrim.capacity(),
            "roster still open"
        );
        return Ok(());
    }

    lifecycle::transition(scrim, ScrimState::LobbyFull, events)?;
    attendance::spawn_confirmations(scrim, now, events);
    attendance::check_all_confirmed(scrim, events)
}

fn ensure_pending(scrim: &Scrim, actor_id: &str, applicant_id: &str) -> ScrimResult<()> {
    if !scrim.is_organizer(actor_id) {
        return Err(ScrimError::Forbidden(format!(
            "{actor_id} is not the organizer of scrim {}",
            scrim.id
        )));
    }
    let postulation = scrim.postulation(applicant_id).ok_or_else(|| {
        ScrimError::NotFound(format!("postulation for {applicant_id} in scrim {}", scrim.id))
    })?;
    if !postulation.is_pending() {
        return Err(ScrimError::InvalidState(format!(
            "postulation for {applicant_id} is already {}",
            postulation.status
        )));
    }
    Ok(())
}

fn reject(postulation: &mut Postulation, reason: String, now: u64) {
    postulation.status = PostulationStatus::Rejected;
    postulation.rejection_reason = Some(reason);
    postulation.decided_at = Some(now);
}
