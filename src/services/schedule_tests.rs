use crate::api::*;
use crate::db::repositories::LocalRepository;
use crate::db::repository::AbsenceRepository;
use crate::services::error::{ErrorKind, ServiceError};

use super::{create_slot, delete_slot, get_slot, list_group_slots, update_slot};
use crate::services::conflict::check_slot_availability;

const ADMIN: i64 = 1;
const HEAD_CS: i64 = 2;
const HEAD_MATH: i64 = 6;
const TEACHER_A: i64 = 3;
const TEACHER_B: i64 = 7;
const STUDENT: i64 = 4;
const GROUP_CS: i64 = 1000;
const GROUP_MATH: i64 = 2000;
const ROOM_A: i64 = 600;
const ROOM_B: i64 = 601;
const SUBJECT_DB: i64 = 500;
const SEMESTER: i64 = 700;

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

fn user(id: i64, role: Role, department: Option<i64>, group: Option<i64>) -> User {
    User {
        id: UserId::new(id),
        name: format!("user-{}", id),
        role,
        status: UserStatus::Active,
        department_id: department.map(DepartmentId::new),
        group_id: group.map(GroupId::new),
    }
}

fn draft(day: DayOfWeek, start: &str, end: &str, teacher: i64, room: i64, group: i64) -> SlotDraft {
    SlotDraft {
        semester_id: SemesterId::new(SEMESTER),
        day,
        start: t(start),
        end: t(end),
        subject_id: SubjectId::new(SUBJECT_DB),
        teacher_id: UserId::new(teacher),
        room_id: RoomId::new(room),
        group_id: GroupId::new(group),
        session_type: SessionType::Lecture,
        notes: None,
    }
}

fn fixture() -> LocalRepository {
    let repo = LocalRepository::new();

    repo.seed_department(Department {
        id: DepartmentId::new(1),
        name: "Computer Science".to_string(),
    });
    repo.seed_department(Department {
        id: DepartmentId::new(2),
        name: "Mathematics".to_string(),
    });
    repo.seed_specialty(Specialty {
        id: SpecialtyId::new(10),
        name: "Software Engineering".to_string(),
        department_id: DepartmentId::new(1),
    });
    repo.seed_specialty(Specialty {
        id: SpecialtyId::new(20),
        name: "Applied Mathematics".to_string(),
        department_id: DepartmentId::new(2),
    });
    repo.seed_level(Level {
        id: LevelId::new(100),
        name: "L3".to_string(),
        specialty_id: SpecialtyId::new(10),
    });
    repo.seed_level(Level {
        id: LevelId::new(200),
        name: "M1".to_string(),
        specialty_id: SpecialtyId::new(20),
    });
    repo.seed_group(Group {
        id: GroupId::new(GROUP_CS),
        name: "L3-A".to_string(),
        level_id: LevelId::new(100),
    });
    repo.seed_group(Group {
        id: GroupId::new(GROUP_MATH),
        name: "M1-B".to_string(),
        level_id: LevelId::new(200),
    });

    repo.seed_user(user(ADMIN, Role::Admin, None, None));
    repo.seed_user(user(HEAD_CS, Role::DepartmentHead, Some(1), None));
    repo.seed_user(user(HEAD_MATH, Role::DepartmentHead, Some(2), None));
    repo.seed_user(user(TEACHER_A, Role::Teacher, Some(1), None));
    repo.seed_user(user(TEACHER_B, Role::Teacher, Some(1), None));
    repo.seed_user(user(STUDENT, Role::Student, Some(1), Some(GROUP_CS)));

    repo.seed_subject(Subject {
        id: SubjectId::new(SUBJECT_DB),
        name: "Databases".to_string(),
        department_id: DepartmentId::new(1),
    });
    repo.seed_room(Room {
        id: RoomId::new(ROOM_A),
        name: "B-204".to_string(),
        capacity: Some(40),
    });
    repo.seed_room(Room {
        id: RoomId::new(ROOM_B),
        name: "B-205".to_string(),
        capacity: Some(40),
    });
    repo.seed_semester(Semester {
        id: SemesterId::new(SEMESTER),
        name: "S1 2025".to_string(),
        start_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        active: true,
    });

    repo
}

#[tokio::test]
async fn test_create_slot_as_admin() {
    let repo = fixture();
    let slot = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    assert_eq!(slot.day, DayOfWeek::Monday);
    assert!(!slot.cancelled);
    assert_eq!(repo.slot_count(), 1);
}

#[tokio::test]
async fn test_create_slot_rejects_inverted_time_range() {
    let repo = fixture();
    let err = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "10:00", "08:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(repo.slot_count(), 0);
}

#[tokio::test]
async fn test_create_slot_rejects_unknown_references() {
    let repo = fixture();

    let mut missing_room = draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, 999, GROUP_CS);
    let err = create_slot(&repo, &missing_room, UserId::new(ADMIN))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // A user that exists but is not a teacher is not a valid teacher ref.
    missing_room.room_id = RoomId::new(ROOM_A);
    missing_room.teacher_id = UserId::new(STUDENT);
    let err = create_slot(&repo, &missing_room, UserId::new(ADMIN))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_slot_forbidden_for_teacher_and_student() {
    let repo = fixture();
    let payload = draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS);

    for actor in [TEACHER_A, STUDENT] {
        let err = create_slot(&repo, &payload, UserId::new(actor))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
    assert_eq!(repo.slot_count(), 0);
}

#[tokio::test]
async fn test_create_slot_department_head_scoping() {
    let repo = fixture();
    let payload = draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS);

    let err = create_slot(&repo, &payload, UserId::new(HEAD_MATH))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    create_slot(&repo, &payload, UserId::new(HEAD_CS))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_slot_conflict_on_teacher_axis() {
    let repo = fixture();
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    // Same teacher, different room and group.
    let err = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "09:00", "11:00", TEACHER_A, ROOM_B, GROUP_MATH),
        UserId::new(ADMIN),
    )
    .await
    .unwrap_err();

    match err {
        ServiceError::Conflict { conflicting, .. } => {
            let detail = conflicting.expect("conflict detail expected");
            assert_eq!(detail.axis, ConflictAxis::Teacher);
            assert_eq!(detail.subject_name, "Databases");
            assert_eq!(detail.start, t("08:00"));
            assert_eq!(detail.end, t("10:00"));
        }
        other => panic!("expected Conflict, got {:?}", other),
    }

    // Disjoint teacher, room, and group succeed.
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "09:00", "11:00", TEACHER_B, ROOM_B, GROUP_MATH),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();
    assert_eq!(repo.slot_count(), 2);
}

#[tokio::test]
async fn test_touching_slots_share_a_room() {
    let repo = fixture();
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "10:00", "12:00", TEACHER_B, ROOM_A, GROUP_MATH),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();
    assert_eq!(repo.slot_count(), 2);
}

#[tokio::test]
async fn test_update_slot_rechecks_conflicts_excluding_itself() {
    let repo = fixture();
    let first = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "10:00", "12:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    // Shifting the first slot within its own window is fine.
    let shift = SlotPatch {
        start: Some(t("08:30")),
        ..Default::default()
    };
    update_slot(&repo, first.id, &shift, UserId::new(ADMIN))
        .await
        .unwrap();

    // Stretching it into the second slot is a conflict.
    let stretch = SlotPatch {
        end: Some(t("10:30")),
        ..Default::default()
    };
    let err = update_slot(&repo, first.id, &stretch, UserId::new(ADMIN))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_cancelling_a_slot_frees_its_resources() {
    let repo = fixture();
    let slot = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    let cancel = SlotPatch {
        cancelled: Some(true),
        ..Default::default()
    };
    update_slot(&repo, slot.id, &cancel, UserId::new(ADMIN))
        .await
        .unwrap();

    // The exact same placement is free again.
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delete_slot_blocked_by_absence_records() {
    let repo = fixture();
    let slot = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    repo.insert_absence(UserId::new(STUDENT), slot.id, chrono::Utc::now())
        .await
        .unwrap();

    let err = delete_slot(&repo, slot.id, UserId::new(ADMIN))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(repo.slot_count(), 1);
}

#[tokio::test]
async fn test_delete_slot_without_absences() {
    let repo = fixture();
    let slot = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    let err = delete_slot(&repo, slot.id, UserId::new(TEACHER_A))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    delete_slot(&repo, slot.id, UserId::new(HEAD_CS))
        .await
        .unwrap();
    assert_eq!(repo.slot_count(), 0);
}

#[tokio::test]
async fn test_scoped_reads() {
    let repo = fixture();
    let slot = create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    // The student's own group is visible.
    get_slot(&repo, slot.id, UserId::new(STUDENT)).await.unwrap();
    let slots = list_group_slots(&repo, GroupId::new(GROUP_CS), UserId::new(STUDENT))
        .await
        .unwrap();
    assert_eq!(slots.len(), 1);

    // Another group's timetable is not.
    let err = list_group_slots(&repo, GroupId::new(GROUP_MATH), UserId::new(STUDENT))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_availability_probe_makes_no_writes() {
    let repo = fixture();
    create_slot(
        &repo,
        &draft(DayOfWeek::Monday, "08:00", "10:00", TEACHER_A, ROOM_A, GROUP_CS),
        UserId::new(ADMIN),
    )
    .await
    .unwrap();

    let conflict = check_slot_availability(
        &repo,
        &draft(DayOfWeek::Monday, "09:00", "11:00", TEACHER_A, ROOM_B, GROUP_MATH),
        None,
    )
    .await
    .unwrap();

    assert!(conflict.is_some());
    assert_eq!(repo.slot_count(), 1);
}
