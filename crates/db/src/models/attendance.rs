//! Daily attendance rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

/// One employee's attendance for one local work date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: DbId,
    pub employee_id: DbId,
    pub work_date: NaiveDate,
    pub check_in: Option<Timestamp>,
    pub check_out: Option<Timestamp>,
    pub status: String,
    pub late_minutes: i32,
    pub work_minutes: i32,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Manual correction by HR. Only non-`None` fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct CorrectAttendance {
    pub check_in: Option<Timestamp>,
    pub check_out: Option<Timestamp>,
    pub status: Option<String>,
    pub late_minutes: Option<i32>,
    pub work_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Attendance row with the employee name, for HR listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceWithEmployee {
    pub id: DbId,
    pub employee_id: DbId,
    pub employee_name: String,
    pub employee_number: String,
    pub work_date: NaiveDate,
    pub check_in: Option<Timestamp>,
    pub check_out: Option<Timestamp>,
    pub status: String,
    pub late_minutes: i32,
    pub work_minutes: i32,
    pub source: String,
    pub notes: Option<String>,
}
