//! Repository for the `attendances` table.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use studio_core::attendance::DayRecord;
use studio_core::types::{DbId, Timestamp};

use crate::models::attendance::{Attendance, AttendanceWithEmployee, CorrectAttendance};

const COLUMNS: &str = "id, employee_id, work_date, check_in, check_out, status, late_minutes, \
                       work_minutes, source, notes, created_at, updated_at";

pub struct AttendanceRepo;

impl AttendanceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendances WHERE id = $1");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_day(
        pool: &PgPool,
        employee_id: DbId,
        work_date: NaiveDate,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM attendances WHERE employee_id = $1 AND work_date = $2");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(employee_id)
            .bind(work_date)
            .fetch_optional(pool)
            .await
    }

    /// Write a day rebuilt from machine punches.
    ///
    /// Rows corrected by HR (`source = 'manual'`) are left untouched.
    /// Returns `false` when the existing row was kept.
    pub async fn upsert_from_punches(
        pool: &PgPool,
        employee_id: DbId,
        day: &DayRecord,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO attendances
                (employee_id, work_date, check_in, check_out, status, late_minutes, work_minutes, source)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'machine')
             ON CONFLICT ON CONSTRAINT uq_attendances_employee_date DO UPDATE SET
                check_in = EXCLUDED.check_in,
                check_out = EXCLUDED.check_out,
                status = EXCLUDED.status,
                late_minutes = EXCLUDED.late_minutes,
                work_minutes = EXCLUDED.work_minutes,
                source = 'machine'
             WHERE attendances.source <> 'manual'",
        )
        .bind(employee_id)
        .bind(day.work_date)
        .bind(day.check_in)
        .bind(day.check_out)
        .bind(day.status.as_str())
        .bind(day.late_minutes)
        .bind(day.work_minutes)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a whole-day status (on leave, holiday) without punches.
    ///
    /// Days on which the employee actually checked in keep their record.
    pub async fn upsert_status(
        conn: &mut PgConnection,
        employee_id: DbId,
        work_date: NaiveDate,
        status: &str,
        source: &str,
        notes: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO attendances (employee_id, work_date, status, source, notes)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_attendances_employee_date DO UPDATE SET
                status = EXCLUDED.status,
                source = EXCLUDED.source,
                notes = EXCLUDED.notes,
                late_minutes = 0
             WHERE attendances.check_in IS NULL",
        )
        .bind(employee_id)
        .bind(work_date)
        .bind(status)
        .bind(source)
        .bind(notes)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a status row only if the employee has no record for the day.
    pub async fn insert_status_if_missing(
        pool: &PgPool,
        employee_id: DbId,
        work_date: NaiveDate,
        status: &str,
        source: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO attendances (employee_id, work_date, status, source)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_attendances_employee_date DO NOTHING",
        )
        .bind(employee_id)
        .bind(work_date)
        .bind(status)
        .bind(source)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a web check-in.
    ///
    /// Returns `None` if the employee already checked in that day.
    pub async fn record_check_in(
        pool: &PgPool,
        employee_id: DbId,
        work_date: NaiveDate,
        check_in: Timestamp,
        status: &str,
        late_minutes: i32,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendances (employee_id, work_date, check_in, status, late_minutes, source)
             VALUES ($1, $2, $3, $4, $5, 'web')
             ON CONFLICT ON CONSTRAINT uq_attendances_employee_date DO UPDATE SET
                check_in = EXCLUDED.check_in,
                status = EXCLUDED.status,
                late_minutes = EXCLUDED.late_minutes,
                source = 'web'
             WHERE attendances.check_in IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(employee_id)
            .bind(work_date)
            .bind(check_in)
            .bind(status)
            .bind(late_minutes)
            .fetch_optional(pool)
            .await
    }

    /// Record a check-out on a row that has a check-in and no check-out yet.
    pub async fn record_check_out(
        pool: &PgPool,
        id: DbId,
        check_out: Timestamp,
        work_minutes: i32,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendances SET check_out = $2, work_minutes = $3
             WHERE id = $1 AND check_in IS NOT NULL AND check_out IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .bind(check_out)
            .bind(work_minutes)
            .fetch_optional(pool)
            .await
    }

    /// One employee's records in an inclusive date range, oldest first.
    pub async fn list_for_employee(
        pool: &PgPool,
        employee_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendances
             WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
             ORDER BY work_date ASC"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// HR listing across employees.
    pub async fn list(
        pool: &PgPool,
        employee_id: Option<DbId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceWithEmployee>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceWithEmployee>(
            "SELECT a.id, a.employee_id, e.full_name AS employee_name, e.employee_number,
                    a.work_date, a.check_in, a.check_out, a.status, a.late_minutes,
                    a.work_minutes, a.source, a.notes
             FROM attendances a JOIN employees e ON e.id = a.employee_id
             WHERE ($1::bigint IS NULL OR a.employee_id = $1)
               AND a.work_date BETWEEN $2 AND $3
             ORDER BY a.work_date DESC, e.full_name ASC",
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Apply an HR correction; the row becomes `manual` so syncs keep it.
    pub async fn correct(
        pool: &PgPool,
        id: DbId,
        input: &CorrectAttendance,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendances SET
                check_in = COALESCE($2, check_in),
                check_out = COALESCE($3, check_out),
                status = COALESCE($4, status),
                late_minutes = COALESCE($5, late_minutes),
                work_minutes = COALESCE($6, work_minutes),
                notes = COALESCE($7, notes),
                source = 'manual'
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .bind(input.check_in)
            .bind(input.check_out)
            .bind(&input.status)
            .bind(input.late_minutes)
            .bind(input.work_minutes)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Active employees, already hired by `work_date`, with no attendance
    /// row for that day.
    pub async fn employees_without_record(
        pool: &PgPool,
        work_date: NaiveDate,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT e.id FROM employees e
             WHERE e.is_active = true
               AND (e.hire_date IS NULL OR e.hire_date <= $1)
               AND NOT EXISTS (
                   SELECT 1 FROM attendances a
                   WHERE a.employee_id = e.id AND a.work_date = $1)
             ORDER BY e.id",
        )
        .bind(work_date)
        .fetch_all(pool)
        .await
    }
}
