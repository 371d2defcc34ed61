//! Equipment inventory and loan models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Equipment {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub condition: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New equipment starts with every unit available.
#[derive(Debug, Deserialize)]
pub struct CreateEquipment {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i32,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EquipmentLoan {
    pub id: DbId,
    pub equipment_id: DbId,
    pub borrower_id: DbId,
    pub episode_id: Option<DbId>,
    pub quantity: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub purpose: Option<String>,
    pub status: String,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub decision_notes: Option<String>,
    pub returned_at: Option<Timestamp>,
    pub return_condition: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipmentLoan {
    pub equipment_id: DbId,
    pub episode_id: Option<DbId>,
    pub quantity: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub purpose: Option<String>,
}
