use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

/// HR record of a staff member, optionally linked to a login.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub employee_number: String,
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    /// User id enrolled on the biometric machines.
    pub biometric_pin: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub annual_leave_quota: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployee {
    pub user_id: Option<DbId>,
    pub employee_number: String,
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub biometric_pin: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub annual_leave_quota: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEmployee {
    pub user_id: Option<DbId>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub biometric_pin: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub annual_leave_quota: Option<i32>,
    pub is_active: Option<bool>,
}
