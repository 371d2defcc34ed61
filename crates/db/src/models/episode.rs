use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

/// One episode of a program, tracked through the department pipeline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Episode {
    pub id: DbId,
    pub program_id: DbId,
    pub episode_number: i32,
    pub title: String,
    pub synopsis: Option<String>,
    pub air_date: Option<NaiveDate>,
    /// 1..=7 for the owning department, 8 once promotion is done.
    pub workflow_step: i16,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEpisode {
    pub episode_number: i32,
    pub title: String,
    pub synopsis: Option<String>,
    pub air_date: Option<NaiveDate>,
}

/// Episode joined with its program name, used to label notifications.
#[derive(Debug, Clone, FromRow)]
pub struct EpisodeLabelRow {
    pub id: DbId,
    pub program_id: DbId,
    pub program_name: String,
    pub producer_id: Option<DbId>,
    pub episode_number: i32,
    pub title: String,
}
