//! Biometric machines and the raw punches pulled from them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

pub const SYNC_STATUS_OK: &str = "ok";
pub const SYNC_STATUS_FAILED: &str = "failed";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BiometricMachine {
    pub id: DbId,
    pub name: String,
    pub ip_address: String,
    pub port: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub last_synced_at: Option<Timestamp>,
    pub last_sync_status: Option<String>,
    pub last_sync_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateBiometricMachine {
    pub name: String,
    pub ip_address: String,
    pub port: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBiometricMachine {
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<i32>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceLog {
    pub id: DbId,
    pub machine_id: DbId,
    pub employee_id: Option<DbId>,
    pub biometric_pin: String,
    pub punched_at: Timestamp,
    pub verify_mode: Option<String>,
    pub created_at: Timestamp,
}

/// A punch read from a device, before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPunch {
    pub biometric_pin: String,
    pub punched_at: Timestamp,
    pub verify_mode: Option<String>,
}
