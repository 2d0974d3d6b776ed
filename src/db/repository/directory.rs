//! Directory repository trait for reference-data lookups.
//!
//! The wider platform owns users, departments, specialties, levels, groups,
//! subjects, rooms and semesters through its own CRUD managers. The core only
//! reads them, with one exception: the derived student status written by the
//! elimination policy.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    Department, DepartmentId, Group, GroupId, Room, RoomId, Semester, SemesterId, Subject,
    SubjectId, User, UserId, UserStatus,
};

/// Repository trait for directory (reference data) operations.
///
/// Unknown ids fail with `RepositoryError::NotFound`; the core treats the
/// directory as authoritative and never creates or repairs its records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Check if the storage connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch a user by id.
    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User>;

    /// Fetch a department by id.
    async fn get_department(&self, department_id: DepartmentId) -> RepositoryResult<Department>;

    /// Fetch a group by id.
    async fn get_group(&self, group_id: GroupId) -> RepositoryResult<Group>;

    /// Fetch a subject by id.
    async fn get_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject>;

    /// Fetch a room by id.
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room>;

    /// Fetch a semester by id.
    async fn get_semester(&self, semester_id: SemesterId) -> RepositoryResult<Semester>;

    /// Resolve the department a group belongs to.
    ///
    /// Walks the group → level → specialty → department chain.
    ///
    /// # Returns
    /// * `Ok(DepartmentId)` - Owning department
    /// * `Err(RepositoryError::NotFound)` - If any link of the chain is missing
    async fn department_of_group(&self, group_id: GroupId) -> RepositoryResult<DepartmentId>;

    /// List every group, ordered by id.
    async fn list_groups(&self) -> RepositoryResult<Vec<Group>>;

    /// List the groups whose level → specialty chain lands in the given
    /// department, ordered by id.
    async fn list_groups_in_department(
        &self,
        department_id: DepartmentId,
    ) -> RepositoryResult<Vec<Group>>;

    /// Overwrite a user's derived status.
    ///
    /// This is the only directory write the core performs; it carries the
    /// elimination policy's output (`eliminated` ↔ `active`).
    ///
    /// # Returns
    /// * `Ok(User)` - The updated user record
    /// * `Err(RepositoryError::NotFound)` - If the user doesn't exist
    async fn set_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> RepositoryResult<User>;
}
