//! Work items (one per episode and department) and their action log.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkItem {
    pub id: DbId,
    pub episode_id: DbId,
    pub department: String,
    pub status: String,
    pub assigned_to: Option<DbId>,
    pub details: serde_json::Value,
    /// Incremented each time the item is sent back to pending by a handoff.
    pub round: i32,
    pub started_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Optional filters for listing work items.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WorkItemFilter {
    pub department: Option<String>,
    pub status: Option<String>,
    pub episode_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
}

/// One recorded action on a work item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkReview {
    pub id: DbId,
    pub work_item_id: DbId,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub from_status: String,
    pub to_status: String,
    pub round: i32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewWorkReview<'a> {
    pub work_item_id: DbId,
    pub actor_id: DbId,
    pub action: &'a str,
    pub from_status: &'a str,
    pub to_status: &'a str,
    pub round: i32,
    pub notes: Option<&'a str>,
}
