//! Schedule operations: gated create/update/delete of timetable slots.
//!
//! Every mutation passes through two gates, in order: the access scope
//! resolver (`Forbidden` on failure) and the conflict detector (`Conflict`
//! with full diagnostics). All validation errors are raised before any
//! write; the repository's overlap backstop covers the race window behind
//! the service-level check.

use log::debug;

use crate::api::{
    Group, GroupId, SlotDraft, SlotPatch, TimetableSlot, TimetableSlotId, UserId,
};
use crate::db::repository::{FullRepository, RepositoryError};

use super::access;
use super::conflict;
use super::error::{ServiceError, ServiceResult};

/// Validate that every entity a draft references exists in the directory.
///
/// The teacher reference must resolve to a user holding the teacher role;
/// anything else counts as a missing teacher.
async fn validate_references<R: FullRepository>(
    repo: &R,
    draft: &SlotDraft,
) -> ServiceResult<()> {
    repo.get_semester(draft.semester_id).await?;
    repo.get_subject(draft.subject_id).await?;
    repo.get_room(draft.room_id).await?;
    repo.get_group(draft.group_id).await?;

    let teacher = repo.get_user(draft.teacher_id).await?;
    if teacher.role != crate::api::Role::Teacher {
        return Err(ServiceError::NotFound(format!(
            "Teacher {} not found",
            draft.teacher_id
        )));
    }
    Ok(())
}

fn validate_time_range(draft: &SlotDraft) -> ServiceResult<()> {
    if draft.start >= draft.end {
        return Err(ServiceError::InvalidFormat(format!(
            "Slot start {} must be before end {}",
            draft.start, draft.end
        )));
    }
    Ok(())
}

async fn ensure_can_edit<R: FullRepository>(
    repo: &R,
    actor_id: UserId,
    group_id: GroupId,
) -> ServiceResult<()> {
    let actor = repo.get_user(actor_id).await?;
    if !access::can_edit(repo, actor_id, actor.role, group_id).await? {
        return Err(ServiceError::Forbidden(format!(
            "User {} may not edit the timetable of group {}",
            actor_id, group_id
        )));
    }
    Ok(())
}

/// Run the conflict gate and translate a hit into a `Conflict` error.
async fn ensure_no_conflict<R: FullRepository>(
    repo: &R,
    proposal: &SlotDraft,
    exclude: Option<TimetableSlotId>,
) -> ServiceResult<()> {
    if let Some(existing) = conflict::find_conflict(repo, proposal, exclude).await? {
        let detail = conflict::describe_conflict(repo, &existing, proposal).await;
        return Err(ServiceError::conflict(detail));
    }
    Ok(())
}

/// The repository backstop reports overlaps as unique violations; surface
/// them as scheduling conflicts, not duplicates.
fn map_backstop(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::UniqueViolation { message, .. } => ServiceError::Conflict {
            message,
            conflicting: None,
        },
        other => other.into(),
    }
}

/// Create a timetable slot.
///
/// Gates, in order: time-range validation, reference validation, access
/// scope, conflict detection. Returns the persisted slot with its id.
pub async fn create_slot<R: FullRepository>(
    repo: &R,
    draft: &SlotDraft,
    actor_id: UserId,
) -> ServiceResult<TimetableSlot> {
    validate_time_range(draft)?;
    validate_references(repo, draft).await?;
    ensure_can_edit(repo, actor_id, draft.group_id).await?;
    ensure_no_conflict(repo, draft, None).await?;

    let slot = repo.insert_slot(draft).await.map_err(map_backstop)?;
    debug!(
        "Created slot {} ({:?} {}-{}, group {})",
        slot.id, slot.day, slot.start, slot.end, slot.group_id
    );
    Ok(slot)
}

/// Update a timetable slot.
///
/// Merges the patch over the stored slot and re-runs the same gates as
/// creation on the merged values, excluding the slot itself from the
/// conflict scan.
pub async fn update_slot<R: FullRepository>(
    repo: &R,
    slot_id: TimetableSlotId,
    patch: &SlotPatch,
    actor_id: UserId,
) -> ServiceResult<TimetableSlot> {
    let existing = repo.get_slot(slot_id).await?;
    let merged = patch.apply(&existing);
    let proposal = SlotDraft::from_slot(&merged);

    validate_time_range(&proposal)?;
    validate_references(repo, &proposal).await?;
    ensure_can_edit(repo, actor_id, merged.group_id).await?;
    // Only patches that move the slot (day, time, semester, or a resource)
    // need the conflict gate; a notes-only edit cannot introduce a clash.
    if !merged.cancelled && patch.affects_placement() {
        ensure_no_conflict(repo, &proposal, Some(slot_id)).await?;
    }

    let slot = repo.update_slot(&merged).await.map_err(map_backstop)?;
    debug!("Updated slot {}", slot.id);
    Ok(slot)
}

/// Delete a timetable slot.
///
/// A slot with absence records cannot be removed; the records must be
/// cleaned up explicitly first.
pub async fn delete_slot<R: FullRepository>(
    repo: &R,
    slot_id: TimetableSlotId,
    actor_id: UserId,
) -> ServiceResult<()> {
    let slot = repo.get_slot(slot_id).await?;
    ensure_can_edit(repo, actor_id, slot.group_id).await?;

    if repo.has_absences_for_slot(slot_id).await? {
        return Err(ServiceError::conflict_message(format!(
            "Slot {} has absence records; delete them before removing the slot",
            slot_id
        )));
    }

    repo.delete_slot(slot_id).await?;
    debug!("Deleted slot {}", slot_id);
    Ok(())
}

/// Fetch a slot, gated by view scope on its group.
pub async fn get_slot<R: FullRepository>(
    repo: &R,
    slot_id: TimetableSlotId,
    actor_id: UserId,
) -> ServiceResult<TimetableSlot> {
    let slot = repo.get_slot(slot_id).await?;
    ensure_can_view(repo, actor_id, slot.group_id).await?;
    Ok(slot)
}

/// List a group's slots, gated by view scope.
pub async fn list_group_slots<R: FullRepository>(
    repo: &R,
    group_id: GroupId,
    actor_id: UserId,
) -> ServiceResult<Vec<TimetableSlot>> {
    ensure_can_view(repo, actor_id, group_id).await?;
    Ok(repo.list_slots_for_group(group_id).await?)
}

/// The groups the actor may see; see [`access::list_accessible_groups`].
pub async fn list_accessible_groups<R: FullRepository>(
    repo: &R,
    actor_id: UserId,
) -> ServiceResult<Vec<Group>> {
    access::list_accessible_groups(repo, actor_id).await
}

async fn ensure_can_view<R: FullRepository>(
    repo: &R,
    actor_id: UserId,
    group_id: GroupId,
) -> ServiceResult<()> {
    let actor = repo.get_user(actor_id).await?;
    if !access::can_view(repo, actor_id, actor.role, group_id).await? {
        return Err(ServiceError::Forbidden(format!(
            "User {} may not view the timetable of group {}",
            actor_id, group_id
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod schedule_tests;
