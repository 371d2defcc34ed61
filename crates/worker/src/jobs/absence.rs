//! Mark employees absent on working days they have no attendance for.

use chrono::NaiveDate;
use sqlx::PgPool;
use studio_core::attendance::{AttendanceSource, AttendanceStatus};
use studio_core::calendar::is_working_day;
use studio_db::repositories::{AttendanceRepo, HolidayRepo};

/// Insert an `absent` row for every active employee without a record on
/// `date`. Weekends and holidays are skipped. Returns the rows created.
pub async fn mark_absences(pool: &PgPool, date: NaiveDate) -> anyhow::Result<u64> {
    let holidays = HolidayRepo::dates_between(pool, date, date).await?;
    if !is_working_day(date, &holidays) {
        tracing::debug!(%date, "Not a working day, no absences marked");
        return Ok(0);
    }

    let missing = AttendanceRepo::employees_without_record(pool, date).await?;
    let mut marked = 0;
    for employee_id in missing {
        let created = AttendanceRepo::insert_status_if_missing(
            pool,
            employee_id,
            date,
            AttendanceStatus::Absent.as_str(),
            AttendanceSource::System.as_str(),
        )
        .await?;
        if created {
            marked += 1;
        }
    }

    tracing::info!(%date, marked, "Absences marked");
    Ok(marked)
}
