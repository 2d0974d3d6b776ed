//! Public API surface for the UniOps core.
//!
//! This file consolidates the domain types shared across the repository and
//! service layers. All types derive Serialize/Deserialize for JSON
//! serialization at the shell boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::time::{overlaps, TimeOfDay, TimeParseError};

use crate::define_id_type;

define_id_type!(i64, UserId);
define_id_type!(i64, DepartmentId);
define_id_type!(i64, SpecialtyId);
define_id_type!(i64, LevelId);
define_id_type!(i64, GroupId);
define_id_type!(i64, SubjectId);
define_id_type!(i64, RoomId);
define_id_type!(i64, SemesterId);
define_id_type!(i64, TimetableSlotId);
define_id_type!(i64, AbsenceId);

/// Platform role of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    DepartmentHead,
    Admin,
}

/// Account status of a user.
///
/// `Eliminated` is derived from the elimination policy and is only written by
/// the absence lifecycle engine; it can revert to `Active` on recomputation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Eliminated,
}

/// Day of week for a recurring weekly slot.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Pedagogical kind of a timetable slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Lecture,
    Td,
    Tp,
    Exam,
    Makeup,
}

/// Lifecycle state of an absence record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Unexcused,
    Pending,
    Excused,
    Rejected,
}

impl AbsenceStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AbsenceStatus::Excused | AbsenceStatus::Rejected)
    }
}

/// Outcome of an excuse review.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcuseDecision {
    Excused,
    Rejected,
}

impl From<ExcuseDecision> for AbsenceStatus {
    fn from(decision: ExcuseDecision) -> Self {
        match decision {
            ExcuseDecision::Excused => AbsenceStatus::Excused,
            ExcuseDecision::Rejected => AbsenceStatus::Rejected,
        }
    }
}

/// Resource dimension along which two slots collide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAxis {
    Teacher,
    Room,
    Group,
}

impl std::fmt::Display for ConflictAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictAxis::Teacher => write!(f, "teacher"),
            ConflictAxis::Room => write!(f, "room"),
            ConflictAxis::Group => write!(f, "group"),
        }
    }
}

/// A recurring weekly class occupancy within a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: TimetableSlotId,
    pub semester_id: SemesterId,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub subject_id: SubjectId,
    pub teacher_id: UserId,
    pub room_id: RoomId,
    pub group_id: GroupId,
    pub session_type: SessionType,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimetableSlot {
    /// True when the slot occupies the given resource.
    pub fn occupies(&self, axis: ConflictAxis, other: &SlotDraft) -> bool {
        match axis {
            ConflictAxis::Teacher => self.teacher_id == other.teacher_id,
            ConflictAxis::Room => self.room_id == other.room_id,
            ConflictAxis::Group => self.group_id == other.group_id,
        }
    }
}

/// Create payload for a timetable slot (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDraft {
    pub semester_id: SemesterId,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub subject_id: SubjectId,
    pub teacher_id: UserId,
    pub room_id: RoomId,
    pub group_id: GroupId,
    pub session_type: SessionType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SlotDraft {
    /// Rebuild the draft view of an existing slot, for conflict re-checks.
    pub fn from_slot(slot: &TimetableSlot) -> Self {
        Self {
            semester_id: slot.semester_id,
            day: slot.day,
            start: slot.start,
            end: slot.end,
            subject_id: slot.subject_id,
            teacher_id: slot.teacher_id,
            room_id: slot.room_id,
            group_id: slot.group_id,
            session_type: slot.session_type,
            notes: slot.notes.clone(),
        }
    }
}

/// Partial update for a timetable slot. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotPatch {
    pub semester_id: Option<SemesterId>,
    pub day: Option<DayOfWeek>,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    pub subject_id: Option<SubjectId>,
    pub teacher_id: Option<UserId>,
    pub room_id: Option<RoomId>,
    pub group_id: Option<GroupId>,
    pub session_type: Option<SessionType>,
    pub cancelled: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl SlotPatch {
    /// Merge this patch over an existing slot, producing the proposed slot.
    pub fn apply(&self, slot: &TimetableSlot) -> TimetableSlot {
        TimetableSlot {
            id: slot.id,
            semester_id: self.semester_id.unwrap_or(slot.semester_id),
            day: self.day.unwrap_or(slot.day),
            start: self.start.unwrap_or(slot.start),
            end: self.end.unwrap_or(slot.end),
            subject_id: self.subject_id.unwrap_or(slot.subject_id),
            teacher_id: self.teacher_id.unwrap_or(slot.teacher_id),
            room_id: self.room_id.unwrap_or(slot.room_id),
            group_id: self.group_id.unwrap_or(slot.group_id),
            session_type: self.session_type.unwrap_or(slot.session_type),
            cancelled: self.cancelled.unwrap_or(slot.cancelled),
            notes: self.notes.clone().unwrap_or_else(|| slot.notes.clone()),
        }
    }

    /// True when the patch touches a field the conflict detector cares about.
    pub fn affects_placement(&self) -> bool {
        self.semester_id.is_some()
            || self.day.is_some()
            || self.start.is_some()
            || self.end.is_some()
            || self.teacher_id.is_some()
            || self.room_id.is_some()
            || self.group_id.is_some()
    }
}

/// One absence record per (student, timetable slot) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub id: AbsenceId,
    pub student_id: UserId,
    pub slot_id: TimetableSlotId,
    pub status: AbsenceStatus,
    #[serde(default)]
    pub excuse_reason: Option<String>,
    #[serde(default)]
    pub excuse_document: Option<String>,
    #[serde(default)]
    pub excuse_submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_by: Option<UserId>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Typed query filter for absence listings. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceFilter {
    pub student_id: Option<UserId>,
    pub subject_id: Option<SubjectId>,
    pub teacher_id: Option<UserId>,
    pub status: Option<AbsenceStatus>,
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// User projection relevant to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// Academic department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// Specialty within a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: SpecialtyId,
    pub name: String,
    pub department_id: DepartmentId,
}

/// Study level within a specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub specialty_id: SpecialtyId,
}

/// Student group within a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub level_id: LevelId,
}

/// Taught subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub department_id: DepartmentId,
}

/// Physical room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// Date-bounded academic period. At most one is active at a time; the active
/// flag is maintained by the external semester manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub active: bool,
}

/// User-facing diagnostic for a scheduling clash.
///
/// Carries enough detail (axis, colliding subject, time range) for a human to
/// resolve the clash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConflict {
    pub axis: ConflictAxis,
    pub slot_id: TimetableSlotId,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl std::fmt::Display for SlotConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} already occupied by '{}' ({:?} {}-{})",
            self.axis, self.subject_name, self.day, self.start, self.end
        )
    }
}
