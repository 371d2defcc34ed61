//! Repository for the `notifications` table.

use sqlx::{PgConnection, PgPool};
use studio_core::types::{DbId, Timestamp};

use crate::models::notification::{NewNotification, Notification};

const COLUMNS: &str = "id, user_id, kind, title, message, entity_type, entity_id, \
                       is_read, read_at, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for one user, returning the generated ID.
    pub async fn create(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &NewNotification<'_>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, kind, title, message, entity_type, entity_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.kind)
        .bind(input.title)
        .bind(input.message)
        .bind(input.entity_type)
        .bind(input.entity_id)
        .fetch_one(conn)
        .await
    }

    /// Notify every active user holding one of `roles`, except `exclude`.
    ///
    /// Returns the number of notifications created.
    pub async fn notify_roles(
        conn: &mut PgConnection,
        roles: &[&str],
        exclude: Option<DbId>,
        input: &NewNotification<'_>,
    ) -> Result<u64, sqlx::Error> {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message, entity_type, entity_id) \
             SELECT u.id, $3, $4, $5, $6, $7 \
             FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE r.name = ANY($1) AND u.is_active = true \
               AND ($2::bigint IS NULL OR u.id <> $2)",
        )
        .bind(&roles)
        .bind(exclude)
        .bind(input.kind)
        .bind(input.title)
        .bind(input.message)
        .bind(input.entity_type)
        .bind(input.entity_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// List notifications for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark one of the user's notifications as read.
    ///
    /// Returns `false` when it does not exist, belongs to someone else or
    /// was already read.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read, returning how many changed.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Delete read notifications created before `cutoff`.
    pub async fn delete_read_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE is_read = true AND created_at < $1")
                .bind(cutoff)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
