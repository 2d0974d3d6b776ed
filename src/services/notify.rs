//! Notification events and the fire-and-forget dispatch sink.
//!
//! The core emits lifecycle events towards an external notification service
//! (push/email delivery is out of scope). Dispatch is advisory: a failing
//! sink is logged and swallowed, never surfacing as a failure of the
//! absence or scheduling operation that triggered it.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::UserId;

/// Lifecycle event carried to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    AbsenceWarning { user_id: UserId, message: String },
    EliminationRisk { user_id: UserId, message: String },
    ExcuseSubmitted { user_id: UserId, message: String },
    ExcuseReviewed { user_id: UserId, message: String },
}

impl NotificationEvent {
    /// The user the event targets.
    pub fn target(&self) -> UserId {
        match self {
            Self::AbsenceWarning { user_id, .. }
            | Self::EliminationRisk { user_id, .. }
            | Self::ExcuseSubmitted { user_id, .. }
            | Self::ExcuseReviewed { user_id, .. } => *user_id,
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::AbsenceWarning { message, .. }
            | Self::EliminationRisk { message, .. }
            | Self::ExcuseSubmitted { message, .. }
            | Self::ExcuseReviewed { message, .. } => message,
        }
    }
}

/// Error returned by a failing sink.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Delivery endpoint for lifecycle events.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the services hold them across
/// await points.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one event. Failures are advisory (see [`notify`]).
    async fn dispatch(&self, event: NotificationEvent) -> Result<(), NotifyError>;
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn dispatch(&self, _event: NotificationEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// In-memory sink for unit tests and local development.
///
/// Records every dispatched event and can be switched into a failing mode to
/// exercise the log-and-swallow path.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<RwLock<Vec<NotificationEvent>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events dispatched so far.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.read().clone()
    }

    /// Number of events dispatched so far.
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Make subsequent dispatches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn dispatch(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("sink unavailable".to_string()));
        }
        self.events.write().push(event);
        Ok(())
    }
}

/// Fire-and-forget dispatch.
///
/// Delivery failures must never fail the triggering operation; they are
/// logged at `warn` and dropped.
pub async fn notify<S: NotificationSink>(sink: &S, event: NotificationEvent) {
    let target = event.target();
    if let Err(err) = sink.dispatch(event).await {
        log::warn!("Dropping notification for user {}: {}", target, err);
    }
}
