//! # UniOps Rust Core
//!
//! University operations core engine.
//!
//! This crate provides the algorithmic core of the UniOps platform: the
//! recurring-timetable conflict engine and the absence lifecycle / elimination
//! state machine that consumes it. The surrounding CRUD resource managers
//! (departments, specialties, rooms, messaging, exports) live outside this
//! crate and are consumed here as read-only directory data.
//!
//! ## Features
//!
//! - **Conflict Detection**: weekly recurring slots checked per resource axis
//!   (teacher, room, group) within a semester
//! - **Access Scoping**: per-role view/edit resolution for groups and timetables
//! - **Absence Lifecycle**: unexcused → pending → excused/rejected state
//!   machine with reviewer authorization
//! - **Elimination Policy**: derived student status recomputed after every
//!   absence mutation
//! - **Notifications**: fire-and-forget lifecycle events for an external sink
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Consolidated domain types shared across layers
//! - [`models`]: Wall-clock time handling and shared helper macros
//! - [`db`]: Repository traits, backends, and persistence plumbing
//! - [`services`]: High-level business logic invoked by the routing shell
//!
//! The routing/authentication shell and the notification transport are out of
//! scope; the core is driven through typed function calls only.

// Allow large error types - ServiceError carries rich conflict diagnostics
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;
