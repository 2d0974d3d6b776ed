//! Absence repository trait for the lifecycle engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::api::{
    Absence, AbsenceFilter, AbsenceId, AbsenceStatus, SubjectId, TimetableSlotId, UserId,
};

/// Repository trait for absence record storage.
///
/// # Concurrency
/// Status transitions are compare-and-set: `update_absence` verifies the
/// record still holds `expected_status` under the same lock or transaction as
/// the write and fails with `RepositoryError::ConcurrentModification` when a
/// concurrent transition won. Counting queries always re-scan; no counter is
/// cached anywhere.
#[async_trait]
pub trait AbsenceRepository: Send + Sync {
    /// Create an UNEXCUSED absence record for (student, slot).
    ///
    /// # Returns
    /// * `Ok(Absence)` - The stored record with assigned id
    /// * `Err(RepositoryError::UniqueViolation)` - If a record already exists
    ///   for this (student, slot) pair
    async fn insert_absence(
        &self,
        student_id: UserId,
        slot_id: TimetableSlotId,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<Absence>;

    /// Fetch an absence by id.
    async fn get_absence(&self, absence_id: AbsenceId) -> RepositoryResult<Absence>;

    /// Find the record for a (student, slot) pair, if any.
    async fn find_absence(
        &self,
        student_id: UserId,
        slot_id: TimetableSlotId,
    ) -> RepositoryResult<Option<Absence>>;

    /// Replace an absence record, guarded by its expected current status.
    ///
    /// # Arguments
    /// * `absence` - The full updated record, including its id
    /// * `expected_status` - Status the stored record must still hold
    ///
    /// # Returns
    /// * `Ok(Absence)` - The stored record
    /// * `Err(RepositoryError::NotFound)` - If the id doesn't exist
    /// * `Err(RepositoryError::ConcurrentModification)` - If the stored
    ///   status no longer matches `expected_status`
    async fn update_absence(
        &self,
        absence: &Absence,
        expected_status: AbsenceStatus,
    ) -> RepositoryResult<Absence>;

    /// Delete an absence by id, returning the removed record.
    async fn delete_absence(&self, absence_id: AbsenceId) -> RepositoryResult<Absence>;

    /// List absences matching a typed filter, ordered by creation time.
    ///
    /// Subject and teacher filters join through the referenced slot.
    async fn list_absences(&self, filter: &AbsenceFilter) -> RepositoryResult<Vec<Absence>>;

    /// Count a student's UNEXCUSED absences within one subject.
    ///
    /// Feeds the record-time elimination trigger (warning at 3, elimination
    /// at 5).
    async fn unexcused_count_in_subject(
        &self,
        student_id: UserId,
        subject_id: SubjectId,
    ) -> RepositoryResult<usize>;

    /// Count a student's UNEXCUSED absences across all subjects.
    ///
    /// Feeds the global re-evaluation after excuse approval or deletion.
    async fn unexcused_count_global(&self, student_id: UserId) -> RepositoryResult<usize>;

    /// True when any absence record references the slot.
    ///
    /// Gates slot deletion: a slot with absences cannot be removed until the
    /// records are cleaned up explicitly.
    async fn has_absences_for_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<bool>;
}
