//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer that sits between the repository
//! traits and the application shell. Services orchestrate repository calls
//! and implement the access, conflict, and lifecycle rules of the core.
//!
//! All functions are generic over [`crate::db::repository::FullRepository`],
//! so they run unchanged against any backend.

pub mod absence;
pub mod access;
pub mod conflict;
pub mod elimination;
pub mod error;
pub mod notify;
pub mod schedule;

pub use absence::{
    delete_absence, list_absences, record_absence, review_excuse, submit_excuse,
};
pub use access::{can_edit, can_view};
pub use conflict::{check_slot_availability, find_conflict};
pub use elimination::{compute_status, ELIMINATION_THRESHOLD, WARNING_THRESHOLD};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use notify::{NotificationEvent, NotificationSink, NullSink, RecordingSink};
pub use schedule::{
    create_slot, delete_slot, get_slot, list_accessible_groups, list_group_slots, update_slot,
};
