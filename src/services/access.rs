//! Access scope resolution.
//!
//! Computes, per role, which groups and timetables a user may view or
//! mutate. All checks are pure reads against the directory and timetable
//! relations; the mutating schedule operations call [`can_edit`] before any
//! write and fail with `Forbidden` when it returns false.

use crate::api::{Group, GroupId, Role, UserId};
use crate::db::repository::FullRepository;

use super::error::ServiceResult;

/// Whether the user may view the group's timetable.
///
/// - admin: always
/// - student: only their own group
/// - department_head: only groups whose level → specialty → department chain
///   lands in the head's department
/// - teacher: only groups they have at least one slot with
pub async fn can_view<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    role: Role,
    group_id: GroupId,
) -> ServiceResult<bool> {
    match role {
        Role::Admin => Ok(true),
        Role::Student => {
            let user = repo.get_user(user_id).await?;
            Ok(user.group_id == Some(group_id))
        }
        Role::DepartmentHead => {
            let user = repo.get_user(user_id).await?;
            let Some(department_id) = user.department_id else {
                return Ok(false);
            };
            let group_department = repo.department_of_group(group_id).await?;
            Ok(group_department == department_id)
        }
        Role::Teacher => Ok(repo.teacher_has_group(user_id, group_id).await?),
    }
}

/// Whether the user may mutate the group's timetable.
///
/// Only admins and department heads scoped to the group's department edit;
/// students and teachers never do, regardless of view rights.
pub async fn can_edit<R: FullRepository>(
    repo: &R,
    user_id: UserId,
    role: Role,
    group_id: GroupId,
) -> ServiceResult<bool> {
    match role {
        Role::Admin => Ok(true),
        Role::DepartmentHead => {
            let user = repo.get_user(user_id).await?;
            let Some(department_id) = user.department_id else {
                return Ok(false);
            };
            let group_department = repo.department_of_group(group_id).await?;
            Ok(group_department == department_id)
        }
        Role::Student | Role::Teacher => Ok(false),
    }
}

/// The groups the user may see at all.
///
/// - admin: every group
/// - department_head: groups in their department
/// - student: their own group (zero or one)
/// - teacher: distinct groups across all their slots
pub async fn list_accessible_groups<R: FullRepository>(
    repo: &R,
    user_id: UserId,
) -> ServiceResult<Vec<Group>> {
    let user = repo.get_user(user_id).await?;
    match user.role {
        Role::Admin => Ok(repo.list_groups().await?),
        Role::DepartmentHead => match user.department_id {
            Some(department_id) => Ok(repo.list_groups_in_department(department_id).await?),
            None => Ok(Vec::new()),
        },
        Role::Student => match user.group_id {
            Some(group_id) => Ok(vec![repo.get_group(group_id).await?]),
            None => Ok(Vec::new()),
        },
        Role::Teacher => {
            let mut groups = Vec::new();
            for group_id in repo.distinct_groups_for_teacher(user_id).await? {
                groups.push(repo.get_group(group_id).await?);
            }
            Ok(groups)
        }
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod access_tests;
