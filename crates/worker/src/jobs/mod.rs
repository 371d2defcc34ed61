//! Scheduled jobs. Each can run once from the CLI or on a loop from
//! [`crate::scheduler`].

pub mod absence;
pub mod attendance_sync;
pub mod leave_expiry;
pub mod notification_cleanup;

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use crate::config::WorkerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Job {
    SyncAttendance,
    MarkAbsences,
    ExpireLeave,
    CleanupNotifications,
}

impl Job {
    pub fn name(self) -> &'static str {
        match self {
            Job::SyncAttendance => "sync-attendance",
            Job::MarkAbsences => "mark-absences",
            Job::ExpireLeave => "expire-leave",
            Job::CleanupNotifications => "cleanup-notifications",
        }
    }
}

/// Run one job to completion.
///
/// `date` overrides the office-local day the date-based jobs act on:
/// absences default to yesterday, leave expiry to today.
pub async fn run_once(
    pool: &PgPool,
    config: &WorkerConfig,
    job: Job,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let today = config.schedule.local_date(Utc::now());
    match job {
        Job::SyncAttendance => {
            attendance_sync::run_all(pool, config).await?;
        }
        Job::MarkAbsences => {
            let date = date.unwrap_or(today - Duration::days(1));
            absence::mark_absences(pool, date).await?;
        }
        Job::ExpireLeave => {
            leave_expiry::run(pool, &config.schedule, date.unwrap_or(today)).await?;
        }
        Job::CleanupNotifications => {
            notification_cleanup::run(pool, config.notification_retention_days).await?;
        }
    }
    Ok(())
}
