//! Conflict detection for recurring weekly slots.
//!
//! Within one semester, no two non-cancelled slots sharing a teacher, a room,
//! or a group may overlap on the same day. Candidates for all three axes are
//! loaded in one repository pass; the overlap test then runs per candidate.
//! The same logic serves both as the hard gate before persisting a
//! create/update and as the read-only availability probe used by planning
//! UIs.

use crate::api::{ConflictAxis, SlotConflict, SlotDraft, TimetableSlot, TimetableSlotId};
use crate::db::repository::FullRepository;
use crate::models::time::overlaps;

use super::error::ServiceResult;

/// Find the first slot colliding with the proposal, if any.
///
/// # Arguments
/// * `proposal` - The placement being checked
/// * `exclude` - Slot id to ignore (the slot being updated)
///
/// Read-only; callers decide whether a hit is an error or an answer.
pub async fn find_conflict<R: FullRepository>(
    repo: &R,
    proposal: &SlotDraft,
    exclude: Option<TimetableSlotId>,
) -> ServiceResult<Option<TimetableSlot>> {
    let candidates = repo
        .find_candidate_slots(
            proposal.semester_id,
            proposal.day,
            proposal.teacher_id,
            proposal.room_id,
            proposal.group_id,
            exclude,
        )
        .await?;

    for slot in candidates {
        if overlaps(slot.start, slot.end, proposal.start, proposal.end) {
            return Ok(Some(slot));
        }
    }
    Ok(None)
}

/// Which resource axis the collision happened on.
///
/// A candidate can share more than one resource with the proposal; the first
/// matching axis (teacher, then room, then group) is reported.
pub fn conflict_axis(existing: &TimetableSlot, proposal: &SlotDraft) -> ConflictAxis {
    if existing.occupies(ConflictAxis::Teacher, proposal) {
        ConflictAxis::Teacher
    } else if existing.occupies(ConflictAxis::Room, proposal) {
        ConflictAxis::Room
    } else {
        ConflictAxis::Group
    }
}

/// Build the user-facing diagnostic for a collision.
///
/// Resolves the colliding subject's name so the clash can be reported as
/// "room occupied by 'Databases' monday 08:00-10:00".
pub async fn describe_conflict<R: FullRepository>(
    repo: &R,
    existing: &TimetableSlot,
    proposal: &SlotDraft,
) -> SlotConflict {
    let subject_name = match repo.get_subject(existing.subject_id).await {
        Ok(subject) => subject.name,
        Err(_) => format!("subject {}", existing.subject_id),
    };

    SlotConflict {
        axis: conflict_axis(existing, proposal),
        slot_id: existing.id,
        subject_id: existing.subject_id,
        subject_name,
        day: existing.day,
        start: existing.start,
        end: existing.end,
    }
}

/// Read-only availability probe: the diagnostic for the first collision, or
/// `None` when the placement is free. Identical logic to the persistence
/// gate, with no side effects.
pub async fn check_slot_availability<R: FullRepository>(
    repo: &R,
    proposal: &SlotDraft,
    exclude: Option<TimetableSlotId>,
) -> ServiceResult<Option<SlotConflict>> {
    match find_conflict(repo, proposal, exclude).await? {
        Some(existing) => Ok(Some(describe_conflict(repo, &existing, proposal).await)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod conflict_tests;
