//! Repository for the `programs` table.

use sqlx::PgPool;
use studio_core::types::DbId;

use crate::models::program::{CreateProgram, Program, UpdateProgram};

const COLUMNS: &str =
    "id, name, description, genre, producer_id, is_active, created_by, created_at, updated_at";

pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a program. The creator becomes the producer when none is given.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProgram,
        created_by: DbId,
    ) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (name, description, genre, producer_id, created_by)
             VALUES ($1, $2, $3, COALESCE($4, $5), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.genre)
            .bind(input.producer_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List programs by name. Inactive programs are included only on request.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Program>, sqlx::Error> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = true"
        };
        let query = format!("SELECT {COLUMNS} FROM programs {filter} ORDER BY name ASC");
        sqlx::query_as::<_, Program>(&query).fetch_all(pool).await
    }

    /// Apply the non-`None` fields of `input`. Returns `None` if missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                genre = COALESCE($4, genre),
                producer_id = COALESCE($5, producer_id),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.genre)
            .bind(input.producer_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
