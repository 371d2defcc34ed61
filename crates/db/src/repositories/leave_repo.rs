//! Repository for the `leave_requests` table.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use studio_core::types::DbId;

use crate::models::leave::{CreateLeaveRequest, LeaveRequest};

const COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, days, reason, status, \
                       reviewed_by, reviewed_at, review_notes, created_at, updated_at";

pub struct LeaveRepo;

impl LeaveRepo {
    pub async fn create(
        conn: &mut PgConnection,
        employee_id: DbId,
        input: &CreateLeaveRequest,
        days: i32,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, days, reason)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(employee_id)
            .bind(&input.leave_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(days)
            .bind(&input.reason)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leave_requests WHERE id = $1");
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leave_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List requests, optionally filtered by status and employee, newest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        employee_id: Option<DbId>,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR employee_id = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(status)
            .bind(employee_id)
            .fetch_all(pool)
            .await
    }

    /// Annual-leave days already taken in `year` (by start date).
    ///
    /// With `include_pending`, requests still awaiting review are counted
    /// too so an employee cannot queue more than the quota.
    pub async fn used_annual_days(
        conn: &mut PgConnection,
        employee_id: DbId,
        year: i32,
        include_pending: bool,
    ) -> Result<i32, sqlx::Error> {
        let statuses = if include_pending {
            "('approved', 'pending')"
        } else {
            "('approved')"
        };
        let query = format!(
            "SELECT COALESCE(SUM(days), 0)::int FROM leave_requests
             WHERE employee_id = $1
               AND leave_type = 'annual'
               AND status IN {statuses}
               AND EXTRACT(YEAR FROM start_date)::int = $2"
        );
        sqlx::query_scalar(&query)
            .bind(employee_id)
            .bind(year)
            .fetch_one(conn)
            .await
    }

    /// Whether a pending or approved request overlaps the given range.
    pub async fn overlaps(
        conn: &mut PgConnection,
        employee_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM leave_requests
                WHERE employee_id = $1
                  AND status IN ('pending', 'approved')
                  AND start_date <= $3 AND end_date >= $2)",
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_one(conn)
        .await
    }

    /// Store a review outcome (approved / rejected / cancelled).
    pub async fn record_decision(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
        reviewed_by: DbId,
        notes: Option<&str>,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let query = format!(
            "UPDATE leave_requests SET
                status = $2, reviewed_by = $3, reviewed_at = NOW(), review_notes = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reviewed_by)
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    /// Lock pending requests that started before `today`.
    ///
    /// Rows another transaction is reviewing are skipped.
    pub async fn lock_expiry_candidates(
        conn: &mut PgConnection,
        today: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests
             WHERE status = 'pending' AND start_date < $1
             ORDER BY id
             FOR UPDATE SKIP LOCKED"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(today)
            .fetch_all(conn)
            .await
    }

    pub async fn mark_expired(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let query = format!(
            "UPDATE leave_requests SET status = 'expired' WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }
}
