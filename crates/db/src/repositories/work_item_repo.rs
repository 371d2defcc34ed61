//! Repositories for `work_items` and `work_reviews`.
//!
//! State-changing methods take a `&mut PgConnection` so the pipeline engine
//! can run a whole transition (lock, update, handoff, notifications) in one
//! transaction.

use sqlx::{PgConnection, PgPool};
use studio_core::types::DbId;

use crate::models::work_item::{NewWorkReview, WorkItem, WorkItemFilter, WorkReview};

const COLUMNS: &str = "id, episode_id, department, status, assigned_to, details, round, \
                       started_at, submitted_at, completed_at, created_at, updated_at";

pub struct WorkItemRepo;

impl WorkItemRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_items WHERE id = $1");
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load and row-lock a work item for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<WorkItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_items WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Load and row-lock the item of one department for an episode.
    pub async fn lock_for_department(
        conn: &mut PgConnection,
        episode_id: DbId,
        department: &str,
    ) -> Result<Option<WorkItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_items \
             WHERE episode_id = $1 AND department = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(episode_id)
            .bind(department)
            .fetch_optional(conn)
            .await
    }

    /// Make sure `department` has a pending item for the episode.
    ///
    /// Creates the item on first handoff. A completed item (the department
    /// already did this work in an earlier round) is reset to pending with
    /// `round` incremented and its timestamps cleared. A quality-control
    /// item also drops the previous round's decision and notes, so every
    /// round is decided afresh. An item that is already open is returned
    /// as-is.
    pub async fn ensure_pending(
        conn: &mut PgConnection,
        episode_id: DbId,
        department: &str,
    ) -> Result<WorkItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_items (episode_id, department)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_work_items_episode_department DO UPDATE SET
                status = 'pending',
                round = work_items.round + 1,
                details = CASE WHEN work_items.department = 'quality_control'
                               THEN work_items.details - 'decision' - 'notes'
                               ELSE work_items.details END,
                started_at = NULL,
                submitted_at = NULL,
                completed_at = NULL
             WHERE work_items.status = 'completed'
             RETURNING {COLUMNS}"
        );
        let upserted = sqlx::query_as::<_, WorkItem>(&query)
            .bind(episode_id)
            .bind(department)
            .fetch_optional(&mut *conn)
            .await?;

        match upserted {
            Some(item) => Ok(item),
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM work_items WHERE episode_id = $1 AND department = $2"
                );
                sqlx::query_as::<_, WorkItem>(&query)
                    .bind(episode_id)
                    .bind(department)
                    .fetch_one(&mut *conn)
                    .await
            }
        }
    }

    /// Write a new status and maintain the lifecycle timestamps.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<WorkItem, sqlx::Error> {
        let query = format!(
            "UPDATE work_items SET
                status = $2::text,
                started_at = CASE WHEN $2::text = 'in_progress'
                                  THEN COALESCE(started_at, NOW()) ELSE started_at END,
                submitted_at = CASE WHEN $2::text = 'submitted' THEN NOW() ELSE submitted_at END,
                completed_at = CASE WHEN $2::text = 'completed' THEN NOW()
                                    WHEN $2::text = 'revision' THEN NULL
                                    ELSE completed_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(conn)
            .await
    }

    pub async fn assign(
        conn: &mut PgConnection,
        id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE work_items SET assigned_to = $2 WHERE id = $1")
            .bind(id)
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn update_details(
        conn: &mut PgConnection,
        id: DbId,
        details: &serde_json::Value,
    ) -> Result<WorkItem, sqlx::Error> {
        let query = format!("UPDATE work_items SET details = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(id)
            .bind(details)
            .fetch_one(conn)
            .await
    }

    /// List work items matching every provided filter, newest activity first.
    pub async fn list(
        pool: &PgPool,
        filter: &WorkItemFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_items
             WHERE ($1::text IS NULL OR department = $1)
               AND ($2::text IS NULL OR status = $2)
               AND ($3::bigint IS NULL OR episode_id = $3)
               AND ($4::bigint IS NULL OR assigned_to = $4)
             ORDER BY updated_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(&filter.department)
            .bind(&filter.status)
            .bind(filter.episode_id)
            .bind(filter.assigned_to)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every work item of an episode, in the order departments received them.
    pub async fn list_for_episode(
        pool: &PgPool,
        episode_id: DbId,
    ) -> Result<Vec<WorkItem>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM work_items WHERE episode_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(episode_id)
            .fetch_all(pool)
            .await
    }

    /// Row-lock every item of an episode in pipeline order.
    pub async fn lock_all_for_episode(
        conn: &mut PgConnection,
        episode_id: DbId,
    ) -> Result<Vec<WorkItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_items WHERE episode_id = $1 ORDER BY id FOR UPDATE"
        );
        sqlx::query_as::<_, WorkItem>(&query)
            .bind(episode_id)
            .fetch_all(conn)
            .await
    }
}

const REVIEW_COLUMNS: &str = "id, work_item_id, actor_id, action, from_status, to_status, \
                              round, notes, created_at, updated_at";

/// Append-only log of actions taken on work items.
pub struct WorkReviewRepo;

impl WorkReviewRepo {
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewWorkReview<'_>,
    ) -> Result<WorkReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_reviews (work_item_id, actor_id, action, from_status, to_status, round, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, WorkReview>(&query)
            .bind(input.work_item_id)
            .bind(input.actor_id)
            .bind(input.action)
            .bind(input.from_status)
            .bind(input.to_status)
            .bind(input.round)
            .bind(input.notes)
            .fetch_one(conn)
            .await
    }

    /// History of a work item, oldest first.
    pub async fn list_for_item(
        pool: &PgPool,
        work_item_id: DbId,
    ) -> Result<Vec<WorkReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM work_reviews WHERE work_item_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, WorkReview>(&query)
            .bind(work_item_id)
            .fetch_all(pool)
            .await
    }
}
