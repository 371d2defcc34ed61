//! The episode pipeline engine.
//!
//! Every department runs the same cycle: its work item is accepted, worked
//! on, then submitted for review or completed directly, after which the
//! next department receives a pending item. All per-department differences
//! come from [`Department`] and [`work_details`]; the functions here only
//! orchestrate one transaction per action:
//!
//! 1. lock the episode, then the work item
//! 2. authorize the actor and compute the transition
//! 3. validate the detail payload when the work is handed in
//! 4. persist status, review log, handoff and notifications
//! 5. commit, then publish events

use serde_json::json;
use sqlx::{PgConnection, PgPool};
use studio_core::department::{Department, WORKFLOW_STEP_DONE};
use studio_core::error::CoreError;
use studio_core::notification::{self, EpisodeLabel, ENTITY_EPISODE, ENTITY_WORK_ITEM};
use studio_core::roles::{has_any_role, PROGRAM_MANAGER_ROLES, ROLE_ADMIN};
use studio_core::types::DbId;
use studio_core::work_details;
use studio_core::workflow::{
    episode_status_for_step, plan_handoff, transition, EpisodeStatus, WorkAction, WorkStatus,
};
use studio_db::models::episode::{CreateEpisode, Episode, EpisodeLabelRow};
use studio_db::models::work_item::{NewWorkReview, WorkItem};
use studio_db::repositories::{
    EpisodeRepo, NotificationRepo, ProgramRepo, WorkItemRepo, WorkReviewRepo,
};
use studio_events::{names, EventBus, PlatformEvent};

use crate::engine::notify::{linked, notify_user};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Result of a work item action.
#[derive(Debug)]
pub struct ActionOutcome {
    pub item: WorkItem,
    pub episode: Episode,
    /// Item created or reset for the next department, if any.
    pub handed_off_to: Option<WorkItem>,
    /// Earlier department's item sent back to revision, if any.
    pub reopened: Option<WorkItem>,
}

fn event_name(action: WorkAction) -> &'static str {
    match action {
        WorkAction::Accept => names::WORK_ACCEPTED,
        WorkAction::Submit => names::WORK_SUBMITTED,
        WorkAction::Approve => names::WORK_APPROVED,
        WorkAction::Reject => names::WORK_REJECTED,
        WorkAction::Complete => names::WORK_COMPLETED,
        WorkAction::Resume => names::WORK_RESUMED,
        WorkAction::Reopen => names::WORK_REOPENED,
        WorkAction::Cancel => names::WORK_CANCELLED,
    }
}

fn parse_department(item: &WorkItem) -> AppResult<Department> {
    Department::parse(&item.department).ok_or_else(|| {
        AppError::InternalError(format!(
            "Work item {} has unknown department '{}'",
            item.id, item.department
        ))
    })
}

fn parse_status(item: &WorkItem) -> AppResult<WorkStatus> {
    WorkStatus::parse(&item.status).ok_or_else(|| {
        AppError::InternalError(format!(
            "Work item {} has unknown status '{}'",
            item.id, item.status
        ))
    })
}

fn label(row: &EpisodeLabelRow) -> EpisodeLabel<'_> {
    EpisodeLabel {
        program_name: &row.program_name,
        episode_number: row.episode_number,
        title: &row.title,
    }
}

/// Decide whether `actor` may take `action` on `item`.
///
/// Department work is done by the department's worker role; once an item
/// is accepted only its assignee (or an admin) may continue it. Reviews
/// are done by the department's reviewer roles and cancellation by program
/// managers. Reopening is never taken directly; it only follows a QC
/// rejection inside [`apply_action`].
pub fn authorize(
    actor: &AuthUser,
    department: Department,
    action: WorkAction,
    item: &WorkItem,
) -> Result<(), CoreError> {
    let allowed = match action {
        WorkAction::Accept => actor.works_in(department),
        WorkAction::Submit | WorkAction::Complete | WorkAction::Resume => {
            actor.works_in(department)
                && (actor.role == ROLE_ADMIN
                    || item.assigned_to.is_none()
                    || item.assigned_to == Some(actor.user_id))
        }
        WorkAction::Approve | WorkAction::Reject => {
            has_any_role(&actor.role, department.reviewer_roles())
        }
        WorkAction::Cancel => has_any_role(&actor.role, PROGRAM_MANAGER_ROLES),
        WorkAction::Reopen => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{}' cannot {action} {department} work",
            actor.role
        )))
    }
}

async fn lock_episode(conn: &mut PgConnection, id: DbId) -> AppResult<Episode> {
    EpisodeRepo::lock(conn, id).await?.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Episode",
        id,
    }))
}

async fn load_label(conn: &mut PgConnection, episode_id: DbId) -> AppResult<EpisodeLabelRow> {
    EpisodeRepo::find_label(conn, episode_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Episode",
            id: episode_id,
        }))
}

/// Create an episode and hand it to the first department.
pub async fn start_episode(
    pool: &PgPool,
    bus: &EventBus,
    actor: &AuthUser,
    program_id: DbId,
    input: &CreateEpisode,
) -> AppResult<(Episode, WorkItem)> {
    let program = ProgramRepo::find_by_id(pool, program_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;
    if !program.is_active {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Program '{}' is inactive",
            program.name
        ))));
    }

    let first = Department::first();
    let mut tx = pool.begin().await?;
    let episode = EpisodeRepo::create(&mut tx, program_id, input, actor.user_id).await?;
    let item = WorkItemRepo::ensure_pending(&mut tx, episode.id, first.as_str()).await?;

    let row = load_label(&mut tx, episode.id).await?;
    let content = notification::work_assigned(first, &label(&row));
    NotificationRepo::notify_roles(
        &mut tx,
        &[first.worker_role()],
        Some(actor.user_id),
        &linked(&content, ENTITY_WORK_ITEM, item.id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        episode_id = episode.id,
        program_id,
        "Episode created"
    );
    bus.publish(
        PlatformEvent::new(names::EPISODE_CREATED)
            .with_source(names::ENTITY_EPISODE, episode.id)
            .with_actor(actor.user_id)
            .with_payload(json!({
                "program_id": program_id,
                "episode_number": episode.episode_number,
                "title": episode.title,
            })),
    );

    Ok((episode, item))
}

/// Cancel an episode and every open work item.
pub async fn cancel_episode(
    pool: &PgPool,
    bus: &EventBus,
    actor: &AuthUser,
    episode_id: DbId,
    reason: Option<&str>,
) -> AppResult<Episode> {
    if !has_any_role(&actor.role, PROGRAM_MANAGER_ROLES) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only producers can cancel episodes".into(),
        )));
    }

    let mut tx = pool.begin().await?;
    let episode = lock_episode(&mut tx, episode_id).await?;
    if matches!(
        EpisodeStatus::parse(&episode.status),
        Some(EpisodeStatus::Completed | EpisodeStatus::Cancelled)
    ) {
        return Err(AppError::Core(CoreError::invalid_transition(
            "episode",
            episode.status,
            "cancel",
        )));
    }

    let mut events = Vec::new();
    for item in WorkItemRepo::lock_all_for_episode(&mut tx, episode_id).await? {
        let from = parse_status(&item)?;
        if from.is_terminal() {
            continue;
        }
        let department = parse_department(&item)?;
        authorize(actor, department, WorkAction::Cancel, &item)?;
        let to = transition(department, from, WorkAction::Cancel)?;
        WorkItemRepo::set_status(&mut tx, item.id, to.as_str()).await?;
        WorkReviewRepo::create(
            &mut tx,
            &NewWorkReview {
                work_item_id: item.id,
                actor_id: actor.user_id,
                action: WorkAction::Cancel.as_str(),
                from_status: from.as_str(),
                to_status: to.as_str(),
                round: item.round,
                notes: reason,
            },
        )
        .await?;
        events.push(
            PlatformEvent::new(event_name(WorkAction::Cancel))
                .with_source(names::ENTITY_EPISODE, episode_id)
                .with_actor(actor.user_id)
                .with_payload(json!({
                    "work_item_id": item.id,
                    "department": department,
                    "from": from,
                    "to": to,
                    "round": item.round,
                    "notes": reason,
                })),
        );
    }
    let cancelled_items = events.len();
    let episode =
        EpisodeRepo::set_status(&mut tx, episode_id, EpisodeStatus::Cancelled.as_str()).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        episode_id,
        cancelled_items,
        "Episode cancelled"
    );
    for event in events {
        bus.publish(event);
    }
    bus.publish(
        PlatformEvent::new(names::EPISODE_CANCELLED)
            .with_source(names::ENTITY_EPISODE, episode_id)
            .with_actor(actor.user_id)
            .with_payload(json!({ "reason": reason, "cancelled_items": cancelled_items })),
    );

    Ok(episode)
}

/// Merge `patch` into the work item's detail payload.
pub async fn update_details(
    pool: &PgPool,
    actor: &AuthUser,
    work_item_id: DbId,
    patch: &serde_json::Value,
) -> AppResult<WorkItem> {
    let mut tx = pool.begin().await?;
    let item = WorkItemRepo::lock(&mut tx, work_item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkItem",
            id: work_item_id,
        }))?;
    let department = parse_department(&item)?;
    let status = parse_status(&item)?;

    // Editing details is part of doing the work.
    authorize(actor, department, WorkAction::Submit, &item).map_err(AppError::Core)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Details cannot be edited while the work item is {status}"
        ))));
    }

    let merged = work_details::merge_details(&item.details, patch)?;
    let updated = WorkItemRepo::update_details(&mut tx, work_item_id, &merged).await?;
    tx.commit().await?;

    tracing::debug!(user_id = actor.user_id, work_item_id, %department, "Work details updated");
    Ok(updated)
}

/// Apply `action` to a work item and everything it implies.
pub async fn apply_action(
    pool: &PgPool,
    bus: &EventBus,
    actor: &AuthUser,
    work_item_id: DbId,
    action: WorkAction,
    notes: Option<&str>,
) -> AppResult<ActionOutcome> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "WorkItem",
            id: work_item_id,
        })
    };
    let episode_id = WorkItemRepo::find_by_id(pool, work_item_id)
        .await?
        .ok_or_else(not_found)?
        .episode_id;

    let mut tx = pool.begin().await?;
    let episode = lock_episode(&mut tx, episode_id).await?;
    let item = WorkItemRepo::lock(&mut tx, work_item_id)
        .await?
        .ok_or_else(not_found)?;

    if episode.status == EpisodeStatus::Cancelled.as_str() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Episode {episode_id} is cancelled"
        ))));
    }

    let department = parse_department(&item)?;
    let from = parse_status(&item)?;
    authorize(actor, department, action, &item)?;
    let to = transition(department, from, action)?;

    if matches!(action, WorkAction::Submit | WorkAction::Complete) {
        work_details::validate_for_completion(department, &item.details)?;
    }
    if action == WorkAction::Accept {
        WorkItemRepo::assign(&mut tx, item.id, actor.user_id).await?;
    }

    let updated = WorkItemRepo::set_status(&mut tx, item.id, to.as_str()).await?;
    WorkReviewRepo::create(
        &mut tx,
        &NewWorkReview {
            work_item_id: item.id,
            actor_id: actor.user_id,
            action: action.as_str(),
            from_status: from.as_str(),
            to_status: to.as_str(),
            round: item.round,
            notes,
        },
    )
    .await?;

    let row = load_label(&mut tx, episode_id).await?;
    let episode_label = label(&row);
    let mut events = vec![PlatformEvent::new(event_name(action))
        .with_source(names::ENTITY_EPISODE, episode_id)
        .with_actor(actor.user_id)
        .with_payload(json!({
            "work_item_id": item.id,
            "department": department,
            "from": from,
            "to": to,
            "round": item.round,
            "notes": notes,
        }))];

    match action {
        WorkAction::Submit => {
            let content = notification::work_submitted(department, &episode_label);
            NotificationRepo::notify_roles(
                &mut tx,
                department.reviewer_roles(),
                Some(actor.user_id),
                &linked(&content, ENTITY_WORK_ITEM, item.id),
            )
            .await?;
        }
        WorkAction::Reject => {
            let content = notification::work_revision(department, &episode_label, notes);
            notify_user(
                &mut tx,
                updated.assigned_to,
                actor.user_id,
                &linked(&content, ENTITY_WORK_ITEM, item.id),
            )
            .await?;
        }
        WorkAction::Approve => {
            let content = notification::work_approved(department, &episode_label);
            notify_user(
                &mut tx,
                updated.assigned_to,
                actor.user_id,
                &linked(&content, ENTITY_WORK_ITEM, item.id),
            )
            .await?;
        }
        _ => {}
    }

    let mut outcome = ActionOutcome {
        item: updated,
        episode,
        handed_off_to: None,
        reopened: None,
    };

    if to == WorkStatus::Completed {
        hand_off(&mut tx, actor, department, &row, &mut outcome, &mut events).await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        episode_id,
        work_item_id,
        %department,
        %action,
        from = %from,
        to = %to,
        "Work item transitioned"
    );
    for event in events {
        bus.publish(event);
    }

    Ok(outcome)
}

/// Apply the handoff that follows completion of `department`'s work item.
async fn hand_off(
    conn: &mut PgConnection,
    actor: &AuthUser,
    department: Department,
    row: &EpisodeLabelRow,
    outcome: &mut ActionOutcome,
    events: &mut Vec<PlatformEvent>,
) -> AppResult<()> {
    let episode_label = label(row);
    let qc_decision = if department == Department::QualityControl {
        work_details::qc_decision(&outcome.item.details)?
    } else {
        None
    };
    let handoff = plan_handoff(department, qc_decision);

    if let Some(next) = handoff.next {
        let next_item = WorkItemRepo::ensure_pending(conn, row.id, next.as_str()).await?;
        let content = notification::work_assigned(next, &episode_label);
        NotificationRepo::notify_roles(
            conn,
            &[next.worker_role()],
            Some(actor.user_id),
            &linked(&content, ENTITY_WORK_ITEM, next_item.id),
        )
        .await?;
        outcome.handed_off_to = Some(next_item);
    }

    if let Some(reopen) = handoff.reopen {
        if let Some(earlier) = WorkItemRepo::lock_for_department(conn, row.id, reopen.as_str())
            .await?
        {
            let earlier_from = parse_status(&earlier)?;
            let earlier_to = transition(reopen, earlier_from, WorkAction::Reopen)?;
            let notes = outcome.item.details.get("notes").and_then(|n| n.as_str());
            let reopened = WorkItemRepo::set_status(conn, earlier.id, earlier_to.as_str()).await?;
            WorkReviewRepo::create(
                conn,
                &NewWorkReview {
                    work_item_id: earlier.id,
                    actor_id: actor.user_id,
                    action: WorkAction::Reopen.as_str(),
                    from_status: earlier_from.as_str(),
                    to_status: earlier_to.as_str(),
                    round: earlier.round,
                    notes,
                },
            )
            .await?;

            let content = notification::qc_rejected(&episode_label, notes);
            let message = linked(&content, ENTITY_WORK_ITEM, earlier.id);
            match reopened.assigned_to {
                Some(_) => notify_user(conn, reopened.assigned_to, actor.user_id, &message).await?,
                None => {
                    NotificationRepo::notify_roles(
                        conn,
                        &[reopen.worker_role()],
                        Some(actor.user_id),
                        &message,
                    )
                    .await?;
                }
            }

            events.push(
                PlatformEvent::new(names::WORK_REOPENED)
                    .with_source(names::ENTITY_EPISODE, row.id)
                    .with_actor(actor.user_id)
                    .with_payload(json!({
                        "work_item_id": earlier.id,
                        "department": reopen,
                        "from": earlier_from,
                        "to": earlier_to,
                        "notes": notes,
                    })),
            );
            outcome.reopened = Some(reopened);
        }
    }

    let status = episode_status_for_step(handoff.workflow_step);
    outcome.episode =
        EpisodeRepo::set_progress(conn, row.id, handoff.workflow_step, status.as_str()).await?;

    if handoff.workflow_step == WORKFLOW_STEP_DONE {
        let content = notification::episode_completed(&episode_label);
        notify_user(
            conn,
            row.producer_id,
            actor.user_id,
            &linked(&content, ENTITY_EPISODE, row.id),
        )
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use studio_core::roles::{ROLE_CREATIVE, ROLE_EDITOR, ROLE_PRODUCER};

    use super::*;

    fn user(id: DbId, role: &str) -> AuthUser {
        AuthUser {
            user_id: id,
            role: role.to_string(),
            department: Department::for_role(role),
        }
    }

    fn item(assigned_to: Option<DbId>) -> WorkItem {
        WorkItem {
            id: 1,
            episode_id: 1,
            department: "creative".to_string(),
            status: "in_progress".to_string(),
            assigned_to,
            details: json!({}),
            round: 1,
            started_at: None,
            submitted_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_the_department_role_accepts() {
        let d = Department::Creative;
        assert!(authorize(&user(1, ROLE_CREATIVE), d, WorkAction::Accept, &item(None)).is_ok());
        assert!(authorize(&user(1, ROLE_EDITOR), d, WorkAction::Accept, &item(None)).is_err());
    }

    #[test]
    fn assignee_owns_the_work() {
        let d = Department::Creative;
        let taken = item(Some(7));
        assert!(authorize(&user(7, ROLE_CREATIVE), d, WorkAction::Submit, &taken).is_ok());
        assert!(authorize(&user(8, ROLE_CREATIVE), d, WorkAction::Submit, &taken).is_err());
        assert!(authorize(&user(9, ROLE_ADMIN), d, WorkAction::Submit, &taken).is_ok());
    }

    #[test]
    fn reviewers_approve() {
        let d = Department::Creative;
        assert!(authorize(&user(2, ROLE_PRODUCER), d, WorkAction::Approve, &item(Some(7))).is_ok());
        assert!(authorize(&user(7, ROLE_CREATIVE), d, WorkAction::Approve, &item(Some(7))).is_err());
    }

    #[test]
    fn nobody_reopens_work_directly() {
        let done = WorkItem {
            department: "editing".to_string(),
            status: "completed".to_string(),
            ..item(Some(7))
        };
        for role in [ROLE_ADMIN, ROLE_PRODUCER, ROLE_EDITOR] {
            assert!(authorize(&user(1, role), Department::Editing, WorkAction::Reopen, &done).is_err());
        }
    }

    #[test]
    fn every_action_has_an_event_name() {
        for action in WorkAction::ALL {
            assert!(event_name(*action).starts_with("work."));
        }
    }
}
