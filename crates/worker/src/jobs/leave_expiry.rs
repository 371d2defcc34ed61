//! Expire pending leave requests nobody reviewed in time.

use chrono::NaiveDate;
use sqlx::PgPool;
use studio_core::attendance::WorkSchedule;
use studio_core::leave::{self, LeaveAction, LeaveStatus};
use studio_core::notification::{self, ENTITY_LEAVE_REQUEST};
use studio_db::models::notification::NewNotification;
use studio_db::repositories::{EmployeeRepo, LeaveRepo, NotificationRepo};

/// Expire stale requests and notify each requester that has a login, in
/// one transaction. Returns the number of expired requests.
pub async fn run(
    pool: &PgPool,
    schedule: &WorkSchedule,
    today: NaiveDate,
) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;
    let candidates = LeaveRepo::lock_expiry_candidates(&mut tx, today).await?;

    let mut expired = 0;
    for request in candidates {
        let Some(status) = LeaveStatus::parse(&request.status) else {
            continue;
        };
        let filed_on = schedule.local_date(request.created_at);
        if !leave::should_expire(status, request.start_date, filed_on, today) {
            continue;
        }
        leave::leave_transition(status, LeaveAction::Expire)?;
        let request = LeaveRepo::mark_expired(&mut tx, request.id).await?;
        expired += 1;

        let Some(employee) = EmployeeRepo::find_by_id(pool, request.employee_id).await? else {
            continue;
        };
        let Some(user_id) = employee.user_id else {
            continue;
        };
        let content = notification::leave_expired(request.start_date, request.end_date);
        NotificationRepo::create(
            &mut tx,
            user_id,
            &NewNotification {
                kind: content.kind,
                title: &content.title,
                message: &content.message,
                entity_type: Some(ENTITY_LEAVE_REQUEST),
                entity_id: Some(request.id),
            },
        )
        .await?;
    }
    tx.commit().await?;

    if expired == 0 {
        tracing::debug!(%today, "No stale leave requests");
    } else {
        tracing::info!(%today, expired, "Stale leave requests expired");
    }
    Ok(expired)
}
