//! Elimination policy: derived student status from unexcused absence counts.
//!
//! Two counting strategies coexist, preserved from observed behavior:
//!
//! - recording an absence evaluates the count *within the triggering
//!   subject* (warning at exactly 3, elimination at 5 or more);
//! - excuse approval and deletion re-evaluate the count *across all
//!   subjects* (restore below 5).
//!
//! Both strategies sit behind named repository methods
//! (`unexcused_count_in_subject` / `unexcused_count_global`) and the two
//! entry points below, so the discrepancy stays visible and can be unified by
//! a later policy decision. Every trigger re-runs the full count; no counter
//! is cached anywhere.

use log::info;

use crate::api::{SubjectId, User, UserId, UserStatus};
use crate::db::repository::FullRepository;

use super::error::ServiceResult;
use super::notify::{notify, NotificationEvent, NotificationSink};

/// Subject-scoped count at which the student is warned.
pub const WARNING_THRESHOLD: usize = 3;

/// Count at which the student is eliminated (subject-scoped at record time,
/// global on re-evaluation).
pub const ELIMINATION_THRESHOLD: usize = 5;

/// Pure re-derivation of the eliminated flag from the global unexcused count.
///
/// Restores an eliminated student whose count fell below the threshold; every
/// other status passes through unchanged. Elimination itself is triggered by
/// the subject-scoped record path, not here.
pub fn compute_status(unexcused_global: usize, current: UserStatus) -> UserStatus {
    if current == UserStatus::Eliminated && unexcused_global < ELIMINATION_THRESHOLD {
        return UserStatus::Active;
    }
    current
}

/// Evaluation run after recording an absence, scoped to the slot's subject.
///
/// At exactly [`WARNING_THRESHOLD`] one warning is emitted; at
/// [`ELIMINATION_THRESHOLD`] or more an elimination-risk notification is
/// emitted and an active student is eliminated.
pub async fn evaluate_after_record<R: FullRepository, S: NotificationSink>(
    repo: &R,
    sink: &S,
    student: &User,
    subject_id: SubjectId,
) -> ServiceResult<()> {
    let count = repo
        .unexcused_count_in_subject(student.id, subject_id)
        .await?;

    let subject_name = match repo.get_subject(subject_id).await {
        Ok(subject) => subject.name,
        Err(_) => format!("subject {}", subject_id),
    };

    if count == WARNING_THRESHOLD {
        notify(
            sink,
            NotificationEvent::AbsenceWarning {
                user_id: student.id,
                message: format!(
                    "You have {} unexcused absences in {}",
                    count, subject_name
                ),
            },
        )
        .await;
    }

    if count >= ELIMINATION_THRESHOLD {
        notify(
            sink,
            NotificationEvent::EliminationRisk {
                user_id: student.id,
                message: format!(
                    "Unexcused absences in {} reached {}; elimination threshold crossed",
                    subject_name, count
                ),
            },
        )
        .await;

        if student.status == UserStatus::Active {
            repo.set_user_status(student.id, UserStatus::Eliminated)
                .await?;
            info!(
                "Student {} eliminated ({} unexcused in subject {})",
                student.id, count, subject_id
            );
        }
    }

    Ok(())
}

/// Re-evaluation run after an excuse approval or an absence deletion.
///
/// Counts globally across all subjects and restores an eliminated student
/// whose count dropped below [`ELIMINATION_THRESHOLD`].
pub async fn reevaluate_status<R: FullRepository, S: NotificationSink>(
    repo: &R,
    _sink: &S,
    student_id: UserId,
) -> ServiceResult<()> {
    let student = repo.get_user(student_id).await?;
    let count = repo.unexcused_count_global(student_id).await?;

    let next = compute_status(count, student.status);
    if next != student.status {
        repo.set_user_status(student_id, next).await?;
        info!(
            "Student {} restored to {:?} ({} unexcused globally)",
            student_id, next, count
        );
    }

    Ok(())
}
