//! Work item state machine and department handoff planning.
//!
//! Every department's unit of work for an episode is a *work item* that moves
//! through the same status machine:
//!
//! ```text
//!            accept             submit*            approve
//! pending ----------> in_progress ------> submitted -------> completed
//!                      ^    |  complete**     | reject           |
//!               resume |    +-----------------|------------------+
//!                      |                      v                  |
//!                      +---------------- revision <--------------+
//!                                                     reopen
//! ```
//!
//! `*` only for departments that require review, `**` only for departments
//! that do not. Reopen is never requested by a user: it follows a QC
//! rejection. Any non-terminal item can be cancelled, which happens when
//! its episode is cancelled.

use crate::define_str_enum;
use crate::department::{Department, WORKFLOW_STEP_DONE};
use crate::error::CoreError;

define_str_enum! {
    /// Lifecycle status of a work item.
    WorkStatus {
        Pending = "pending",
        InProgress = "in_progress",
        Submitted = "submitted",
        Revision = "revision",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

define_str_enum! {
    /// Actions a user can take on a work item.
    WorkAction {
        Accept = "accept",
        Submit = "submit",
        Approve = "approve",
        Reject = "reject",
        Complete = "complete",
        Resume = "resume",
        Reopen = "reopen",
        Cancel = "cancel",
    }
}

define_str_enum! {
    /// Outcome recorded by quality control.
    QcDecision {
        Approved = "approved",
        Rejected = "rejected",
    }
}

impl WorkStatus {
    /// Completed and cancelled items accept no further work (only reopen).
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkStatus::Completed | WorkStatus::Cancelled)
    }

    /// Statuses in which the detail payload may still be edited.
    pub fn is_editable(self) -> bool {
        matches!(self, WorkStatus::InProgress | WorkStatus::Revision)
    }
}

/// Compute the status reached by applying `action` to a work item of
/// `department` currently in `from`.
pub fn transition(
    department: Department,
    from: WorkStatus,
    action: WorkAction,
) -> Result<WorkStatus, CoreError> {
    use WorkAction as A;
    use WorkStatus as S;

    let reviewed = department.requires_review();
    let to = match (action, from) {
        (A::Accept, S::Pending) => S::InProgress,
        (A::Resume, S::Revision) => S::InProgress,
        (A::Submit, S::InProgress | S::Revision) if reviewed => S::Submitted,
        (A::Approve, S::Submitted) => S::Completed,
        (A::Reject, S::Submitted) => S::Revision,
        (A::Complete, S::InProgress | S::Revision) if !reviewed => S::Completed,
        (A::Reopen, S::Completed) => S::Revision,
        (A::Cancel, s) if !s.is_terminal() => S::Cancelled,
        (action, from) => {
            return Err(CoreError::invalid_transition(
                "work item",
                from.as_str(),
                action.as_str(),
            ))
        }
    };
    Ok(to)
}

/// What happens to the episode when a department's work item completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    /// Department whose work item must be created (or reset) as pending.
    pub next: Option<Department>,
    /// Department whose completed work item is sent back to revision.
    pub reopen: Option<Department>,
    /// New value of the episode's `workflow_step`.
    pub workflow_step: i16,
}

/// Plan the handoff that follows completion of `department`'s work.
///
/// Quality control is the only gate that can send work backwards: a rejected
/// QC decision reopens editing and returns the episode to the editing step.
pub fn plan_handoff(department: Department, qc_decision: Option<QcDecision>) -> Handoff {
    if department == Department::QualityControl && qc_decision == Some(QcDecision::Rejected) {
        return Handoff {
            next: None,
            reopen: Some(Department::Editing),
            workflow_step: Department::Editing.step(),
        };
    }

    match department.next() {
        Some(next) => Handoff {
            next: Some(next),
            reopen: None,
            workflow_step: next.step(),
        },
        None => Handoff {
            next: None,
            reopen: None,
            workflow_step: WORKFLOW_STEP_DONE,
        },
    }
}

define_str_enum! {
    /// Coarse episode status derived from its workflow step.
    EpisodeStatus {
        PreProduction = "pre_production",
        Production = "production",
        PostProduction = "post_production",
        QualityControl = "quality_control",
        Broadcasting = "broadcasting",
        Promotion = "promotion",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

/// Map an episode's `workflow_step` to its displayed status.
pub fn episode_status_for_step(step: i16) -> EpisodeStatus {
    match Department::from_step(step) {
        Some(Department::Creative) => EpisodeStatus::PreProduction,
        Some(Department::Production) => EpisodeStatus::Production,
        Some(Department::Sound | Department::Editing) => EpisodeStatus::PostProduction,
        Some(Department::QualityControl) => EpisodeStatus::QualityControl,
        Some(Department::Broadcasting) => EpisodeStatus::Broadcasting,
        Some(Department::Promotion) => EpisodeStatus::Promotion,
        None if step >= WORKFLOW_STEP_DONE => EpisodeStatus::Completed,
        None => EpisodeStatus::PreProduction,
    }
}
