//! Repository for the `episodes` table.

use sqlx::{PgConnection, PgPool};
use studio_core::types::DbId;

use crate::models::episode::{CreateEpisode, Episode, EpisodeLabelRow};

const COLUMNS: &str = "id, program_id, episode_number, title, synopsis, air_date, \
                       workflow_step, status, created_by, created_at, updated_at";

pub struct EpisodeRepo;

impl EpisodeRepo {
    /// Insert a new episode at workflow step 1.
    pub async fn create(
        conn: &mut PgConnection,
        program_id: DbId,
        input: &CreateEpisode,
        created_by: DbId,
    ) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (program_id, episode_number, title, synopsis, air_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(program_id)
            .bind(input.episode_number)
            .bind(&input.title)
            .bind(&input.synopsis)
            .bind(input.air_date)
            .bind(created_by)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load and row-lock an episode for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_for_program(
        pool: &PgPool,
        program_id: DbId,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes WHERE program_id = $1 ORDER BY episode_number ASC"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(program_id)
            .fetch_all(pool)
            .await
    }

    /// Episode plus program name, for notification text.
    pub async fn find_label(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<EpisodeLabelRow>, sqlx::Error> {
        sqlx::query_as::<_, EpisodeLabelRow>(
            "SELECT e.id, e.program_id, p.name AS program_name, p.producer_id, \
                    e.episode_number, e.title \
             FROM episodes e JOIN programs p ON p.id = e.program_id \
             WHERE e.id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Record the episode's position in the pipeline and its derived status.
    pub async fn set_progress(
        conn: &mut PgConnection,
        id: DbId,
        workflow_step: i16,
        status: &str,
    ) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET workflow_step = $2, status = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(workflow_step)
            .bind(status)
            .fetch_one(conn)
            .await
    }

    /// Set only the status (used for cancellation).
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<Episode, sqlx::Error> {
        let query = format!("UPDATE episodes SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(conn)
            .await
    }
}
