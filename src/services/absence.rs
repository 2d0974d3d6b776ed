//! Absence lifecycle engine.
//!
//! State machine per absence record:
//!
//! ```text
//!  [created] --record--> UNEXCUSED
//!  UNEXCUSED --submit_excuse(student)--> PENDING
//!  PENDING --review_excuse(reviewer, excused)--> EXCUSED   (terminal)
//!  PENDING --review_excuse(reviewer, rejected)--> REJECTED (terminal)
//! ```
//!
//! No transition leaves EXCUSED or REJECTED. Every state change triggers the
//! elimination policy: subject-scoped after recording, global after an
//! excuse approval or a deletion (see [`super::elimination`]).
//!
//! Transitions are compare-and-set against the repository, so a concurrent
//! transition on the same record cannot interleave between the validation
//! and the write.

use chrono::Utc;
use log::debug;

use crate::api::{
    Absence, AbsenceFilter, AbsenceId, AbsenceStatus, ExcuseDecision, Role, TimetableSlot,
    TimetableSlotId, User, UserId,
};
use crate::db::repository::FullRepository;

use super::elimination;
use super::error::{ServiceError, ServiceResult};
use super::notify::{notify, NotificationEvent, NotificationSink};

/// Load a user and require the student role.
async fn get_student<R: FullRepository>(repo: &R, student_id: UserId) -> ServiceResult<User> {
    let user = repo.get_user(student_id).await?;
    if user.role != Role::Student {
        return Err(ServiceError::NotFound(format!(
            "Student {} not found",
            student_id
        )));
    }
    Ok(user)
}

/// Review-scope check shared by `review_excuse` and `delete_absence`:
/// admin always; department head iff same department as the student; teacher
/// iff the slot's own teacher.
fn reviewer_in_scope(reviewer: &User, student: &User, slot: &TimetableSlot) -> bool {
    match reviewer.role {
        Role::Admin => true,
        Role::DepartmentHead => {
            reviewer.department_id.is_some() && reviewer.department_id == student.department_id
        }
        Role::Teacher => reviewer.id == slot.teacher_id,
        Role::Student => false,
    }
}

/// Record an absence for a student on a timetable slot.
///
/// The recorder must be a teacher, department head, or admin. A second
/// record for the same (student, slot) pair fails with `AlreadyExists`.
/// On success the record starts UNEXCUSED and the subject-scoped
/// elimination evaluation runs.
pub async fn record_absence<R: FullRepository, S: NotificationSink>(
    repo: &R,
    sink: &S,
    student_id: UserId,
    slot_id: TimetableSlotId,
    recorded_by: UserId,
) -> ServiceResult<Absence> {
    let student = get_student(repo, student_id).await?;
    let slot = repo.get_slot(slot_id).await?;

    let recorder = repo.get_user(recorded_by).await?;
    if recorder.role == Role::Student {
        return Err(ServiceError::Forbidden(format!(
            "User {} may not record absences",
            recorded_by
        )));
    }

    if repo.find_absence(student_id, slot_id).await?.is_some() {
        return Err(ServiceError::AlreadyExists(format!(
            "Absence already recorded for student {} on slot {}",
            student_id, slot_id
        )));
    }

    let absence = repo
        .insert_absence(student_id, slot_id, Utc::now())
        .await?;
    debug!(
        "Recorded absence {} (student {}, slot {})",
        absence.id, student_id, slot_id
    );

    elimination::evaluate_after_record(repo, sink, &student, slot.subject_id).await?;

    Ok(absence)
}

/// Submit an excuse for an absence.
///
/// Only the absence's own student may submit, and only from UNEXCUSED.
/// Transitions to PENDING, stamps the submission time, and notifies the
/// slot's teacher.
pub async fn submit_excuse<R: FullRepository, S: NotificationSink>(
    repo: &R,
    sink: &S,
    absence_id: AbsenceId,
    student_id: UserId,
    reason: impl Into<String>,
    document: Option<String>,
) -> ServiceResult<Absence> {
    let absence = repo.get_absence(absence_id).await?;

    if absence.student_id != student_id {
        return Err(ServiceError::Forbidden(format!(
            "Absence {} does not belong to student {}",
            absence_id, student_id
        )));
    }
    if absence.status != AbsenceStatus::Unexcused {
        return Err(ServiceError::InvalidState(format!(
            "Cannot submit an excuse for absence {} in state {:?}",
            absence_id, absence.status
        )));
    }

    let updated = Absence {
        status: AbsenceStatus::Pending,
        excuse_reason: Some(reason.into()),
        excuse_document: document,
        excuse_submitted_at: Some(Utc::now()),
        ..absence
    };
    let updated = repo
        .update_absence(&updated, AbsenceStatus::Unexcused)
        .await?;

    let student = repo.get_user(student_id).await?;
    let slot = repo.get_slot(updated.slot_id).await?;
    notify(
        sink,
        NotificationEvent::ExcuseSubmitted {
            user_id: slot.teacher_id,
            message: format!(
                "{} submitted an excuse for the absence of {:?} {}",
                student.name, slot.day, slot.start
            ),
        },
    )
    .await;

    Ok(updated)
}

/// Review a pending excuse.
///
/// Authorization: admin always; department head only for students of their
/// own department; teacher only for their own slot. Only PENDING records can
/// be reviewed. The student is notified; an approval triggers the global
/// elimination re-evaluation.
pub async fn review_excuse<R: FullRepository, S: NotificationSink>(
    repo: &R,
    sink: &S,
    absence_id: AbsenceId,
    reviewer_id: UserId,
    decision: ExcuseDecision,
    notes: Option<String>,
) -> ServiceResult<Absence> {
    let absence = repo.get_absence(absence_id).await?;
    let reviewer = repo.get_user(reviewer_id).await?;
    let slot = repo.get_slot(absence.slot_id).await?;
    let student = repo.get_user(absence.student_id).await?;

    if !reviewer_in_scope(&reviewer, &student, &slot) {
        return Err(ServiceError::Forbidden(format!(
            "User {} may not review absence {}",
            reviewer_id, absence_id
        )));
    }
    if absence.status != AbsenceStatus::Pending {
        return Err(ServiceError::InvalidState(format!(
            "Cannot review absence {} in state {:?}",
            absence_id, absence.status
        )));
    }

    let updated = Absence {
        status: decision.into(),
        reviewed_by: Some(reviewer_id),
        reviewed_at: Some(Utc::now()),
        review_notes: notes,
        ..absence
    };
    let updated = repo
        .update_absence(&updated, AbsenceStatus::Pending)
        .await?;
    debug!(
        "Reviewed absence {} as {:?} by user {}",
        absence_id, decision, reviewer_id
    );

    notify(
        sink,
        NotificationEvent::ExcuseReviewed {
            user_id: updated.student_id,
            message: format!(
                "Your excuse for the absence of {:?} {} was {:?}",
                slot.day, slot.start, decision
            ),
        },
    )
    .await;

    if decision == ExcuseDecision::Excused {
        elimination::reevaluate_status(repo, sink, updated.student_id).await?;
    }

    Ok(updated)
}

/// Delete an absence record.
///
/// Authorization mirrors the review rules, plus a student may delete their
/// own record. Deletion triggers the global elimination re-evaluation.
pub async fn delete_absence<R: FullRepository, S: NotificationSink>(
    repo: &R,
    sink: &S,
    absence_id: AbsenceId,
    actor_id: UserId,
) -> ServiceResult<()> {
    let absence = repo.get_absence(absence_id).await?;
    let actor = repo.get_user(actor_id).await?;
    let slot = repo.get_slot(absence.slot_id).await?;
    let student = repo.get_user(absence.student_id).await?;

    let own_record = actor.role == Role::Student && actor.id == absence.student_id;
    if !own_record && !reviewer_in_scope(&actor, &student, &slot) {
        return Err(ServiceError::Forbidden(format!(
            "User {} may not delete absence {}",
            actor_id, absence_id
        )));
    }

    repo.delete_absence(absence_id).await?;
    debug!("Deleted absence {} by user {}", absence_id, actor_id);

    elimination::reevaluate_status(repo, sink, absence.student_id).await?;
    Ok(())
}

/// List absences visible to the actor, then apply the typed filter.
///
/// Each role's scoping rule is applied exactly once: admins are
/// unrestricted; a department head sees only students of their department; a
/// teacher sees only their own slots; a student sees only their own records.
pub async fn list_absences<R: FullRepository>(
    repo: &R,
    actor_id: UserId,
    filter: &AbsenceFilter,
) -> ServiceResult<Vec<Absence>> {
    let actor = repo.get_user(actor_id).await?;
    let mut scoped = filter.clone();

    match actor.role {
        Role::Admin => {}
        Role::Teacher => {
            if scoped.teacher_id.is_some() && scoped.teacher_id != Some(actor_id) {
                return Err(ServiceError::Forbidden(format!(
                    "User {} may only list absences for their own slots",
                    actor_id
                )));
            }
            scoped.teacher_id = Some(actor_id);
        }
        Role::Student => {
            if scoped.student_id.is_some() && scoped.student_id != Some(actor_id) {
                return Err(ServiceError::Forbidden(format!(
                    "User {} may only list their own absences",
                    actor_id
                )));
            }
            scoped.student_id = Some(actor_id);
        }
        Role::DepartmentHead => {}
    }

    let mut absences = repo.list_absences(&scoped).await?;

    // Department heads scope by the student's department, which is not a
    // repository filter field; narrow the result set here.
    if actor.role == Role::DepartmentHead {
        let Some(department_id) = actor.department_id else {
            return Ok(Vec::new());
        };
        let mut in_scope = Vec::with_capacity(absences.len());
        for absence in absences {
            let student = repo.get_user(absence.student_id).await?;
            if student.department_id == Some(department_id) {
                in_scope.push(absence);
            }
        }
        absences = in_scope;
    }

    Ok(absences)
}

#[cfg(test)]
#[path = "absence_tests.rs"]
mod absence_tests;
