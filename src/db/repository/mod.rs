//! Repository trait definitions for storage operations.
//!
//! This module provides a collection of focused repository traits that
//! abstract storage operations. By splitting responsibilities across multiple
//! traits, implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`directory`]: Read-only reference data (users, groups, subjects, ...)
//! - [`timetable`]: Recurring weekly slot storage and candidate queries
//! - [`absence`]: Absence records, counts, and compare-and-set transitions
//!
//! # Trait Composition
//!
//! A complete repository implementation typically implements all traits:
//!
//! ```ignore
//! impl DirectoryRepository for MyRepo { ... }
//! impl TimetableRepository for MyRepo { ... }
//! impl AbsenceRepository for MyRepo { ... }
//! ```
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let user = repo.get_user(user_id).await?;
//!     let slots = repo.list_slots_for_group(group_id).await?;
//!     Ok(())
//! }
//! ```

pub mod absence;
pub mod directory;
pub mod error;
pub mod timetable;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use absence::AbsenceRepository;
pub use directory::DirectoryRepository;
pub use timetable::TimetableRepository;

/// Composite trait bound for a complete repository implementation.
///
/// This trait is automatically implemented for any type that implements all
/// three repository traits. Use this as a convenient bound when a service
/// needs access to all repository operations.
pub trait FullRepository: DirectoryRepository + TimetableRepository + AbsenceRepository {}

// Blanket implementation: any type implementing all three traits automatically implements FullRepository
impl<T> FullRepository for T where T: DirectoryRepository + TimetableRepository + AbsenceRepository {}
