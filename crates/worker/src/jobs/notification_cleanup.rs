//! Housekeeping: old read notifications and dead login sessions.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use studio_db::repositories::{NotificationRepo, SessionRepo};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CleanupOutcome {
    pub notifications: u64,
    pub sessions: u64,
}

pub async fn run(pool: &PgPool, retention_days: i64) -> anyhow::Result<CleanupOutcome> {
    let cutoff = Utc::now() - Duration::days(retention_days);
    let outcome = CleanupOutcome {
        notifications: NotificationRepo::delete_read_older_than(pool, cutoff).await?,
        sessions: SessionRepo::delete_stale(pool).await?,
    };

    if outcome.notifications > 0 || outcome.sessions > 0 {
        tracing::info!(
            notifications = outcome.notifications,
            sessions = outcome.sessions,
            retention_days,
            "Cleanup purged old rows"
        );
    } else {
        tracing::debug!("Cleanup: nothing to purge");
    }
    Ok(outcome)
}
