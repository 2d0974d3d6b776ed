//! Timetable repository trait for recurring weekly slots.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    DayOfWeek, GroupId, RoomId, SemesterId, SlotDraft, TimetableSlot, TimetableSlotId, UserId,
};

/// Repository trait for timetable slot storage.
///
/// # Concurrency
/// The conflict check and the create/update it gates must be equivalent to a
/// serializable read-then-write. Implementations guarantee this by re-running
/// the axis-overlap scan inside `insert_slot`/`update_slot` under the same
/// lock or transaction as the write, failing with
/// `RepositoryError::UniqueViolation` when a concurrent writer got there
/// first. The service-level conflict detector remains the primary, diagnostic
/// check; this is the second line of defense.
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Persist a new slot and assign its id.
    ///
    /// # Arguments
    /// * `draft` - The slot payload to persist
    ///
    /// # Returns
    /// * `Ok(TimetableSlot)` - The stored slot with assigned id
    /// * `Err(RepositoryError::UniqueViolation)` - If the overlap backstop
    ///   rejects the write
    async fn insert_slot(&self, draft: &SlotDraft) -> RepositoryResult<TimetableSlot>;

    /// Fetch a slot by id.
    async fn get_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<TimetableSlot>;

    /// Replace an existing slot.
    ///
    /// # Arguments
    /// * `slot` - The full merged slot, including its id
    ///
    /// # Returns
    /// * `Ok(TimetableSlot)` - The stored slot
    /// * `Err(RepositoryError::NotFound)` - If the id doesn't exist
    /// * `Err(RepositoryError::UniqueViolation)` - If the overlap backstop
    ///   rejects the write
    async fn update_slot(&self, slot: &TimetableSlot) -> RepositoryResult<TimetableSlot>;

    /// Delete a slot by id.
    ///
    /// # Returns
    /// * `Ok(())` - If the slot was removed
    /// * `Err(RepositoryError::NotFound)` - If the id doesn't exist
    async fn delete_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<()>;

    /// Load the conflict candidates for a proposed placement, in one pass.
    ///
    /// Returns every non-cancelled slot in the same semester and day of week
    /// that shares ANY of the teacher, room, or group with the proposal,
    /// excluding `exclude` when re-checking an update.
    ///
    /// # Arguments
    /// * `semester_id` - Semester of the proposal
    /// * `day` - Day of week of the proposal
    /// * `teacher_id` / `room_id` / `group_id` - Resource axes to match
    /// * `exclude` - Slot id to skip (the slot being updated)
    async fn find_candidate_slots(
        &self,
        semester_id: SemesterId,
        day: DayOfWeek,
        teacher_id: UserId,
        room_id: RoomId,
        group_id: GroupId,
        exclude: Option<TimetableSlotId>,
    ) -> RepositoryResult<Vec<TimetableSlot>>;

    /// List every slot of a group, ordered by (day, start).
    async fn list_slots_for_group(&self, group_id: GroupId)
        -> RepositoryResult<Vec<TimetableSlot>>;

    /// Distinct groups across all of a teacher's slots, ordered by id.
    async fn distinct_groups_for_teacher(
        &self,
        teacher_id: UserId,
    ) -> RepositoryResult<Vec<GroupId>>;

    /// True when the teacher has at least one slot with the group.
    async fn teacher_has_group(
        &self,
        teacher_id: UserId,
        group_id: GroupId,
    ) -> RepositoryResult<bool>;
}
