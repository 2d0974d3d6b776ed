use crate::api::*;
use crate::db::repositories::LocalRepository;
use crate::db::repository::TimetableRepository;

use super::{can_edit, can_view, list_accessible_groups};

const ADMIN: i64 = 1;
const HEAD_CS: i64 = 2;
const TEACHER: i64 = 3;
const STUDENT_CS: i64 = 4;
const STUDENT_MATH: i64 = 5;
const GROUP_CS: i64 = 1000;
const GROUP_MATH: i64 = 2000;

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

fn slot_draft(teacher: i64, group: i64) -> SlotDraft {
    SlotDraft {
        semester_id: SemesterId::new(700),
        day: DayOfWeek::Monday,
        start: TimeOfDay::parse("08:00").unwrap(),
        end: TimeOfDay::parse("10:00").unwrap(),
        subject_id: SubjectId::new(500),
        teacher_id: UserId::new(teacher),
        room_id: RoomId::new(600),
        group_id: GroupId::new(group),
        session_type: SessionType::Lecture,
        notes: None,
    }
}

/// Two departments, one group each, a teacher with one slot in the CS group.
async fn fixture() -> LocalRepository {
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
    repo.seed_user(user(TEACHER, Role::Teacher, Some(1), None));
    repo.seed_user(user(STUDENT_CS, Role::Student, Some(1), Some(GROUP_CS)));
    repo.seed_user(user(STUDENT_MATH, Role::Student, Some(2), Some(GROUP_MATH)));

    repo.insert_slot(&slot_draft(TEACHER, GROUP_CS)).await.unwrap();

    repo
}

#[tokio::test]
async fn test_admin_views_and_edits_everything() {
    let repo = fixture().await;
    for group in [GROUP_CS, GROUP_MATH] {
        let group = GroupId::new(group);
        assert!(can_view(&repo, UserId::new(ADMIN), Role::Admin, group)
            .await
            .unwrap());
        assert!(can_edit(&repo, UserId::new(ADMIN), Role::Admin, group)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn test_student_views_only_own_group() {
    let repo = fixture().await;
    let student = UserId::new(STUDENT_CS);

    assert!(can_view(&repo, student, Role::Student, GroupId::new(GROUP_CS))
        .await
        .unwrap());
    assert!(
        !can_view(&repo, student, Role::Student, GroupId::new(GROUP_MATH))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_students_and_teachers_never_edit() {
    let repo = fixture().await;
    for group in [GROUP_CS, GROUP_MATH] {
        let group = GroupId::new(group);
        assert!(
            !can_edit(&repo, UserId::new(STUDENT_CS), Role::Student, group)
                .await
                .unwrap()
        );
        assert!(
            !can_edit(&repo, UserId::new(TEACHER), Role::Teacher, group)
                .await
                .unwrap()
        );
    }
}

#[tokio::test]
async fn test_department_head_scoped_to_own_department() {
    let repo = fixture().await;
    let head = UserId::new(HEAD_CS);

    assert!(
        can_view(&repo, head, Role::DepartmentHead, GroupId::new(GROUP_CS))
            .await
            .unwrap()
    );
    assert!(
        can_edit(&repo, head, Role::DepartmentHead, GroupId::new(GROUP_CS))
            .await
            .unwrap()
    );
    assert!(
        !can_view(&repo, head, Role::DepartmentHead, GroupId::new(GROUP_MATH))
            .await
            .unwrap()
    );
    assert!(
        !can_edit(&repo, head, Role::DepartmentHead, GroupId::new(GROUP_MATH))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_teacher_views_groups_they_teach() {
    let repo = fixture().await;
    let teacher = UserId::new(TEACHER);

    assert!(can_view(&repo, teacher, Role::Teacher, GroupId::new(GROUP_CS))
        .await
        .unwrap());
    assert!(
        !can_view(&repo, teacher, Role::Teacher, GroupId::new(GROUP_MATH))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_list_accessible_groups_per_role() {
    let repo = fixture().await;

    let all = list_accessible_groups(&repo, UserId::new(ADMIN)).await.unwrap();
    assert_eq!(all.len(), 2);

    let head = list_accessible_groups(&repo, UserId::new(HEAD_CS))
        .await
        .unwrap();
    assert_eq!(head.len(), 1);
    assert_eq!(head[0].id, GroupId::new(GROUP_CS));

    let student = list_accessible_groups(&repo, UserId::new(STUDENT_MATH))
        .await
        .unwrap();
    assert_eq!(student.len(), 1);
    assert_eq!(student[0].id, GroupId::new(GROUP_MATH));

    let teacher = list_accessible_groups(&repo, UserId::new(TEACHER))
        .await
        .unwrap();
    assert_eq!(teacher.len(), 1);
    assert_eq!(teacher[0].id, GroupId::new(GROUP_CS));
}
