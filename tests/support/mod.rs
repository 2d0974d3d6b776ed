#![allow(dead_code)]

//! Shared fixture: a small university with two departments, one group each,
//! and the cast of users the scoping rules care about.

use chrono::NaiveDate;
use uniops_rust::api::*;
use uniops_rust::db::repositories::LocalRepository;
use uniops_rust::services::RecordingSink;

pub const ADMIN: i64 = 1;
pub const HEAD_CS: i64 = 2;
pub const HEAD_MATH: i64 = 6;
pub const TEACHER_A: i64 = 3;
pub const TEACHER_B: i64 = 7;
pub const STUDENT: i64 = 4;
pub const STUDENT_MATH: i64 = 5;

pub const DEPT_CS: i64 = 1;
pub const DEPT_MATH: i64 = 2;
pub const GROUP_CS: i64 = 1000;
pub const GROUP_MATH: i64 = 2000;
pub const ROOM_A: i64 = 600;
pub const ROOM_B: i64 = 601;
pub const SUBJECT_DB: i64 = 500;
pub const SUBJECT_ALGO: i64 = 501;
pub const SEMESTER: i64 = 700;

pub fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

pub fn uid(id: i64) -> UserId {
    UserId::new(id)
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

/// Build the seeded repository plus a recording notification sink.
pub fn university() -> (LocalRepository, RecordingSink) {
    let repo = LocalRepository::new();

    repo.seed_department(Department {
        id: DepartmentId::new(DEPT_CS),
        name: "Computer Science".to_string(),
    });
    repo.seed_department(Department {
        id: DepartmentId::new(DEPT_MATH),
        name: "Mathematics".to_string(),
    });
    repo.seed_specialty(Specialty {
        id: SpecialtyId::new(10),
        name: "Software Engineering".to_string(),
        department_id: DepartmentId::new(DEPT_CS),
    });
    repo.seed_specialty(Specialty {
        id: SpecialtyId::new(20),
        name: "Applied Mathematics".to_string(),
        department_id: DepartmentId::new(DEPT_MATH),
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
    repo.seed_user(user(HEAD_CS, Role::DepartmentHead, Some(DEPT_CS), None));
    repo.seed_user(user(HEAD_MATH, Role::DepartmentHead, Some(DEPT_MATH), None));
    repo.seed_user(user(TEACHER_A, Role::Teacher, Some(DEPT_CS), None));
    repo.seed_user(user(TEACHER_B, Role::Teacher, Some(DEPT_CS), None));
    repo.seed_user(user(STUDENT, Role::Student, Some(DEPT_CS), Some(GROUP_CS)));
    repo.seed_user(user(
        STUDENT_MATH,
        Role::Student,
        Some(DEPT_MATH),
        Some(GROUP_MATH),
    ));

    repo.seed_subject(Subject {
        id: SubjectId::new(SUBJECT_DB),
        name: "Databases".to_string(),
        department_id: DepartmentId::new(DEPT_CS),
    });
    repo.seed_subject(Subject {
        id: SubjectId::new(SUBJECT_ALGO),
        name: "Algorithms".to_string(),
        department_id: DepartmentId::new(DEPT_CS),
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
        start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        active: true,
    });

    (repo, RecordingSink::new())
}

/// A draft for the given placement, defaulting to the Databases lecture.
pub fn slot_draft(
    day: DayOfWeek,
    start: &str,
    end: &str,
    teacher: i64,
    room: i64,
    group: i64,
) -> SlotDraft {
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
