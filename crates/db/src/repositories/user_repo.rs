//! Repository for studio staff accounts (`users`).

use sqlx::PgPool;
use studio_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, LoginUser, UpdateUser, User, UserFilter, UserResponse};

const COLUMNS: &str = "id, username, email, full_name, password_hash, role_id, is_active, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// [`COLUMNS`] qualified for queries that join `roles r`.
const JOINED_COLUMNS: &str = "u.id, u.username, u.email, u.full_name, u.password_hash, \
                              u.role_id, u.is_active, u.last_login_at, u.failed_login_count, \
                              u.locked_until, u.created_at, u.updated_at";

const RESPONSE_COLUMNS: &str = "u.id, u.username, u.email, u.full_name, r.name AS role, \
                                u.role_id, u.is_active, u.last_login_at, u.created_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, full_name, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up an account by exact username or by email, ignoring case for
    /// the email.
    pub async fn find_for_login(
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<LoginUser>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}, r.name AS role
             FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.username = $1 OR LOWER(u.email) = LOWER($1)
             ORDER BY (u.username = $1) DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, LoginUser>(&query)
            .bind(login.trim())
            .fetch_optional(pool)
            .await
    }

    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Staff accounts matching `filter`, ordered by full name.
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
    ) -> Result<Vec<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE ($1::text IS NULL OR r.name = $1)
               AND ($2::bool IS NULL OR u.is_active = $2)
               AND ($3::text IS NULL
                    OR u.username ILIKE '%' || $3 || '%'
                    OR u.full_name ILIKE '%' || $3 || '%'
                    OR u.email ILIKE '%' || $3 || '%')
             ORDER BY u.full_name, u.id"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(&filter.role)
            .bind(filter.is_active)
            .bind(&filter.search)
            .fetch_all(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`. `None` if the user is missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                full_name = COALESCE($4, full_name),
                role_id = COALESCE($5, role_id),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.role_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Returns `false` if the user was missing or already inactive.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed login and lock the account until `lock_until` once the
    /// count reaches `max_attempts`. Returns whether the account is now
    /// locked.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_until: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2 THEN $3
                    ELSE locked_until
                END
             WHERE id = $1
             RETURNING failed_login_count >= $2",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_one(pool)
        .await
    }

    /// Clear the failure count and lock, and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set a new password hash and unlock the account.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
