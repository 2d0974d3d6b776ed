//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.
//!
//! # Concurrency
//! A single `RwLock` guards the whole data set. Every mutating operation
//! validates and writes under one write-lock acquisition, which is the
//! in-memory equivalent of the serializable check-then-write the timetable
//! and absence invariants require. The overlap and uniqueness scans inside
//! `insert_slot`/`update_slot`/`insert_absence` are therefore a reliable
//! backstop behind the service-level checks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::{
    AbsenceRepository, DirectoryRepository, ErrorContext, RepositoryError, RepositoryResult,
    TimetableRepository,
};
use crate::models::time::overlaps;

/// In-memory local repository.
///
/// This implementation stores all data in HashMaps, making it ideal for unit
/// tests and local development that need isolation and speed. Directory
/// records are seeded through the `seed_*` helpers; slots and absences go
/// through the repository traits so the backstop checks run.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    users: HashMap<UserId, User>,
    departments: HashMap<DepartmentId, Department>,
    specialties: HashMap<SpecialtyId, Specialty>,
    levels: HashMap<LevelId, Level>,
    groups: HashMap<GroupId, Group>,
    subjects: HashMap<SubjectId, Subject>,
    rooms: HashMap<RoomId, Room>,
    semesters: HashMap<SemesterId, Semester>,

    slots: HashMap<TimetableSlotId, TimetableSlot>,
    absences: HashMap<AbsenceId, Absence>,

    // ID counters
    next_slot_id: i64,
    next_absence_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            departments: HashMap::new(),
            specialties: HashMap::new(),
            levels: HashMap::new(),
            groups: HashMap::new(),
            subjects: HashMap::new(),
            rooms: HashMap::new(),
            semesters: HashMap::new(),
            slots: HashMap::new(),
            absences: HashMap::new(),
            next_slot_id: 1,
            next_absence_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    // ==================== Seeding helpers ====================
    // Directory records are owned by the external CRUD managers; tests and
    // local development seed them directly with chosen ids.

    pub fn seed_user(&self, user: User) -> UserId {
        let id = user.id;
        self.data.write().users.insert(id, user);
        id
    }

    pub fn seed_department(&self, department: Department) -> DepartmentId {
        let id = department.id;
        self.data.write().departments.insert(id, department);
        id
    }

    pub fn seed_specialty(&self, specialty: Specialty) -> SpecialtyId {
        let id = specialty.id;
        self.data.write().specialties.insert(id, specialty);
        id
    }

    pub fn seed_level(&self, level: Level) -> LevelId {
        let id = level.id;
        self.data.write().levels.insert(id, level);
        id
    }

    pub fn seed_group(&self, group: Group) -> GroupId {
        let id = group.id;
        self.data.write().groups.insert(id, group);
        id
    }

    pub fn seed_subject(&self, subject: Subject) -> SubjectId {
        let id = subject.id;
        self.data.write().subjects.insert(id, subject);
        id
    }

    pub fn seed_room(&self, room: Room) -> RoomId {
        let id = room.id;
        self.data.write().rooms.insert(id, room);
        id
    }

    pub fn seed_semester(&self, semester: Semester) -> SemesterId {
        let id = semester.id;
        self.data.write().semesters.insert(id, semester);
        id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of timetable slots stored.
    pub fn slot_count(&self) -> usize {
        self.data.read().slots.len()
    }

    /// Number of absence records stored.
    pub fn absence_count(&self) -> usize {
        self.data.read().absences.len()
    }

    // ==================== Internal helpers ====================

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, data: &LocalData) -> RepositoryResult<()> {
        if !data.is_healthy {
            return Err(RepositoryError::connection("Storage is not healthy"));
        }
        Ok(())
    }

    /// Overlap scan shared by the insert/update backstops.
    ///
    /// Must be called with the write lock held so the scan and the write it
    /// guards cannot interleave with another writer.
    fn overlap_backstop(
        data: &LocalData,
        candidate: &SlotDraft,
        exclude: Option<TimetableSlotId>,
        operation: &str,
    ) -> RepositoryResult<()> {
        for slot in data.slots.values() {
            if Some(slot.id) == exclude || slot.cancelled {
                continue;
            }
            if slot.semester_id != candidate.semester_id || slot.day != candidate.day {
                continue;
            }
            let shares_resource = slot.teacher_id == candidate.teacher_id
                || slot.room_id == candidate.room_id
                || slot.group_id == candidate.group_id;
            if shares_resource && overlaps(slot.start, slot.end, candidate.start, candidate.end) {
                return Err(RepositoryError::unique_violation_with_context(
                    format!("Slot overlaps existing slot {}", slot.id),
                    ErrorContext::new(operation)
                        .with_entity("timetable_slot")
                        .with_entity_id(slot.id),
                ));
            }
        }
        Ok(())
    }

    fn department_of_group_impl(
        data: &LocalData,
        group_id: GroupId,
    ) -> RepositoryResult<DepartmentId> {
        let group = data
            .groups
            .get(&group_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Group {} not found", group_id)))?;
        let level = data.levels.get(&group.level_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Level {} not found", group.level_id))
        })?;
        let specialty = data.specialties.get(&level.specialty_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Specialty {} not found", level.specialty_id))
        })?;
        Ok(specialty.department_id)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User> {
        self.data
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("User {} not found", user_id)))
    }

    async fn get_department(&self, department_id: DepartmentId) -> RepositoryResult<Department> {
        self.data
            .read()
            .departments
            .get(&department_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Department {} not found", department_id))
            })
    }

    async fn get_group(&self, group_id: GroupId) -> RepositoryResult<Group> {
        self.data
            .read()
            .groups
            .get(&group_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Group {} not found", group_id)))
    }

    async fn get_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject> {
        self.data
            .read()
            .subjects
            .get(&subject_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Subject {} not found", subject_id))
            })
    }

    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        self.data
            .read()
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Room {} not found", room_id)))
    }

    async fn get_semester(&self, semester_id: SemesterId) -> RepositoryResult<Semester> {
        self.data
            .read()
            .semesters
            .get(&semester_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Semester {} not found", semester_id))
            })
    }

    async fn department_of_group(&self, group_id: GroupId) -> RepositoryResult<DepartmentId> {
        let data = self.data.read();
        Self::department_of_group_impl(&data, group_id)
    }

    async fn list_groups(&self) -> RepositoryResult<Vec<Group>> {
        let data = self.data.read();
        let mut groups: Vec<Group> = data.groups.values().cloned().collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    async fn list_groups_in_department(
        &self,
        department_id: DepartmentId,
    ) -> RepositoryResult<Vec<Group>> {
        let data = self.data.read();
        let mut groups: Vec<Group> = data
            .groups
            .values()
            .filter(|group| {
                Self::department_of_group_impl(&data, group.id)
                    .map(|dept| dept == department_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    async fn set_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> RepositoryResult<User> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| RepositoryError::not_found(format!("User {} not found", user_id)))?;
        user.status = status;
        Ok(user.clone())
    }
}

#[async_trait]
impl TimetableRepository for LocalRepository {
    async fn insert_slot(&self, draft: &SlotDraft) -> RepositoryResult<TimetableSlot> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        Self::overlap_backstop(&data, draft, None, "insert_slot")?;

        let id = TimetableSlotId::new(data.next_slot_id);
        data.next_slot_id += 1;

        let slot = TimetableSlot {
            id,
            semester_id: draft.semester_id,
            day: draft.day,
            start: draft.start,
            end: draft.end,
            subject_id: draft.subject_id,
            teacher_id: draft.teacher_id,
            room_id: draft.room_id,
            group_id: draft.group_id,
            session_type: draft.session_type,
            cancelled: false,
            notes: draft.notes.clone(),
        };
        data.slots.insert(id, slot.clone());
        Ok(slot)
    }

    async fn get_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<TimetableSlot> {
        self.data
            .read()
            .slots
            .get(&slot_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Timetable slot {} not found", slot_id))
            })
    }

    async fn update_slot(&self, slot: &TimetableSlot) -> RepositoryResult<TimetableSlot> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        if !data.slots.contains_key(&slot.id) {
            return Err(RepositoryError::not_found(format!(
                "Timetable slot {} not found",
                slot.id
            )));
        }
        if !slot.cancelled {
            let draft = SlotDraft::from_slot(slot);
            Self::overlap_backstop(&data, &draft, Some(slot.id), "update_slot")?;
        }
        data.slots.insert(slot.id, slot.clone());
        Ok(slot.clone())
    }

    async fn delete_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        data.slots.remove(&slot_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Timetable slot {} not found", slot_id))
        })?;
        Ok(())
    }

    async fn find_candidate_slots(
        &self,
        semester_id: SemesterId,
        day: DayOfWeek,
        teacher_id: UserId,
        room_id: RoomId,
        group_id: GroupId,
        exclude: Option<TimetableSlotId>,
    ) -> RepositoryResult<Vec<TimetableSlot>> {
        let data = self.data.read();
        let mut candidates: Vec<TimetableSlot> = data
            .slots
            .values()
            .filter(|slot| {
                Some(slot.id) != exclude
                    && !slot.cancelled
                    && slot.semester_id == semester_id
                    && slot.day == day
                    && (slot.teacher_id == teacher_id
                        || slot.room_id == room_id
                        || slot.group_id == group_id)
            })
            .cloned()
            .collect();
        candidates.sort_by_key(|s| s.id);
        Ok(candidates)
    }

    async fn list_slots_for_group(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<TimetableSlot>> {
        let data = self.data.read();
        let mut slots: Vec<TimetableSlot> = data
            .slots
            .values()
            .filter(|slot| slot.group_id == group_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day, s.start, s.id));
        Ok(slots)
    }

    async fn distinct_groups_for_teacher(
        &self,
        teacher_id: UserId,
    ) -> RepositoryResult<Vec<GroupId>> {
        let data = self.data.read();
        let mut groups: Vec<GroupId> = data
            .slots
            .values()
            .filter(|slot| slot.teacher_id == teacher_id)
            .map(|slot| slot.group_id)
            .collect();
        groups.sort();
        groups.dedup();
        Ok(groups)
    }

    async fn teacher_has_group(
        &self,
        teacher_id: UserId,
        group_id: GroupId,
    ) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data
            .slots
            .values()
            .any(|slot| slot.teacher_id == teacher_id && slot.group_id == group_id))
    }
}

#[async_trait]
impl AbsenceRepository for LocalRepository {
    async fn insert_absence(
        &self,
        student_id: UserId,
        slot_id: TimetableSlotId,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<Absence> {
        let mut data = self.data.write();
        self.check_health(&data)?;

        // Uniqueness backstop on (student, slot), under the write lock.
        if data
            .absences
            .values()
            .any(|a| a.student_id == student_id && a.slot_id == slot_id)
        {
            return Err(RepositoryError::unique_violation_with_context(
                format!(
                    "Absence already recorded for student {} on slot {}",
                    student_id, slot_id
                ),
                ErrorContext::new("insert_absence").with_entity("absence"),
            ));
        }

        let id = AbsenceId::new(data.next_absence_id);
        data.next_absence_id += 1;

        let absence = Absence {
            id,
            student_id,
            slot_id,
            status: AbsenceStatus::Unexcused,
            excuse_reason: None,
            excuse_document: None,
            excuse_submitted_at: None,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at,
        };
        data.absences.insert(id, absence.clone());
        Ok(absence)
    }

    async fn get_absence(&self, absence_id: AbsenceId) -> RepositoryResult<Absence> {
        self.data
            .read()
            .absences
            .get(&absence_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Absence {} not found", absence_id))
            })
    }

    async fn find_absence(
        &self,
        student_id: UserId,
        slot_id: TimetableSlotId,
    ) -> RepositoryResult<Option<Absence>> {
        let data = self.data.read();
        Ok(data
            .absences
            .values()
            .find(|a| a.student_id == student_id && a.slot_id == slot_id)
            .cloned())
    }

    async fn update_absence(
        &self,
        absence: &Absence,
        expected_status: AbsenceStatus,
    ) -> RepositoryResult<Absence> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        let stored = data.absences.get_mut(&absence.id).ok_or_else(|| {
            RepositoryError::not_found(format!("Absence {} not found", absence.id))
        })?;
        if stored.status != expected_status {
            return Err(RepositoryError::concurrent_modification(format!(
                "Absence {} is {:?}, expected {:?}",
                absence.id, stored.status, expected_status
            )));
        }
        *stored = absence.clone();
        Ok(absence.clone())
    }

    async fn delete_absence(&self, absence_id: AbsenceId) -> RepositoryResult<Absence> {
        let mut data = self.data.write();
        self.check_health(&data)?;
        data.absences.remove(&absence_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Absence {} not found", absence_id))
        })
    }

    async fn list_absences(&self, filter: &AbsenceFilter) -> RepositoryResult<Vec<Absence>> {
        let data = self.data.read();
        let mut matches: Vec<Absence> = data
            .absences
            .values()
            .filter(|absence| {
                if let Some(student_id) = filter.student_id {
                    if absence.student_id != student_id {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    if absence.status != status {
                        return false;
                    }
                }
                if let Some((from, to)) = filter.date_range {
                    if absence.created_at < from || absence.created_at > to {
                        return false;
                    }
                }
                // Subject and teacher filters join through the slot.
                if filter.subject_id.is_some() || filter.teacher_id.is_some() {
                    let Some(slot) = data.slots.get(&absence.slot_id) else {
                        return false;
                    };
                    if let Some(subject_id) = filter.subject_id {
                        if slot.subject_id != subject_id {
                            return false;
                        }
                    }
                    if let Some(teacher_id) = filter.teacher_id {
                        if slot.teacher_id != teacher_id {
                            return false;
                        }
                    }
                }
                true
            })
            .cloned()
            .collect();
        matches.sort_by_key(|a| (a.created_at, a.id));
        Ok(matches)
    }

    async fn unexcused_count_in_subject(
        &self,
        student_id: UserId,
        subject_id: SubjectId,
    ) -> RepositoryResult<usize> {
        let data = self.data.read();
        Ok(data
            .absences
            .values()
            .filter(|a| a.student_id == student_id && a.status == AbsenceStatus::Unexcused)
            .filter(|a| {
                data.slots
                    .get(&a.slot_id)
                    .map(|slot| slot.subject_id == subject_id)
                    .unwrap_or(false)
            })
            .count())
    }

    async fn unexcused_count_global(&self, student_id: UserId) -> RepositoryResult<usize> {
        let data = self.data.read();
        Ok(data
            .absences
            .values()
            .filter(|a| a.student_id == student_id && a.status == AbsenceStatus::Unexcused)
            .count())
    }

    async fn has_absences_for_slot(&self, slot_id: TimetableSlotId) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data.absences.values().any(|a| a.slot_id == slot_id))
    }
}
