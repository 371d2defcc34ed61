use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

/// A recurring show.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub producer_id: Option<DbId>,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateProgram {
    pub name: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub producer_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProgram {
    pub name: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub producer_id: Option<DbId>,
    pub is_active: Option<bool>,
}
