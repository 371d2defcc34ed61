//! Repositories for `equipment` and `equipment_loans`.

use sqlx::{PgConnection, PgPool};
use studio_core::types::DbId;

use crate::models::equipment::{
    CreateEquipment, CreateEquipmentLoan, Equipment, EquipmentLoan, UpdateEquipment,
};

const COLUMNS: &str = "id, code, name, category, total_quantity, available_quantity, \
                       condition, location, is_active, created_at, updated_at";

pub struct EquipmentRepo;

impl EquipmentRepo {
    /// Insert new equipment with all units available.
    pub async fn create(pool: &PgPool, input: &CreateEquipment) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "INSERT INTO equipment (code, name, category, total_quantity, available_quantity, location)
             VALUES ($1, $2, $3, $4, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.total_quantity)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load and row-lock equipment so its stock can be adjusted safely.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Equipment>, sqlx::Error> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = true"
        };
        let query = format!("SELECT {COLUMNS} FROM equipment {filter} ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Equipment>(&query).fetch_all(pool).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateEquipment,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!(
            "UPDATE equipment SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                condition = COALESCE($4, condition),
                location = COALESCE($5, location),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.condition)
            .bind(&input.location)
            .bind(input.is_active)
            .fetch_optional(conn)
            .await
    }

    /// Change total stock, shifting available stock by the same delta.
    ///
    /// Callers must hold the row lock and have validated the result.
    pub async fn set_stock(
        conn: &mut PgConnection,
        id: DbId,
        total_quantity: i32,
        available_quantity: i32,
    ) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "UPDATE equipment SET total_quantity = $2, available_quantity = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(total_quantity)
            .bind(available_quantity)
            .fetch_one(conn)
            .await
    }

    /// Overwrite the available quantity of a locked equipment row.
    pub async fn adjust_available(
        conn: &mut PgConnection,
        id: DbId,
        available_quantity: i32,
    ) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "UPDATE equipment SET available_quantity = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(available_quantity)
            .fetch_one(conn)
            .await
    }

    /// Record the condition reported when a loan comes back.
    pub async fn set_condition(
        conn: &mut PgConnection,
        id: DbId,
        condition: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE equipment SET condition = $2 WHERE id = $1")
            .bind(id)
            .bind(condition)
            .execute(conn)
            .await?;
        Ok(())
    }
}

const LOAN_COLUMNS: &str = "id, equipment_id, borrower_id, episode_id, quantity, loan_date, \
                            due_date, purpose, status, decided_by, decided_at, decision_notes, \
                            returned_at, return_condition, created_at, updated_at";

pub struct EquipmentLoanRepo;

impl EquipmentLoanRepo {
    pub async fn create(
        conn: &mut PgConnection,
        borrower_id: DbId,
        input: &CreateEquipmentLoan,
    ) -> Result<EquipmentLoan, sqlx::Error> {
        let query = format!(
            "INSERT INTO equipment_loans
                (equipment_id, borrower_id, episode_id, quantity, loan_date, due_date, purpose)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {LOAN_COLUMNS}"
        );
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(input.equipment_id)
            .bind(borrower_id)
            .bind(input.episode_id)
            .bind(input.quantity)
            .bind(input.loan_date)
            .bind(input.due_date)
            .bind(&input.purpose)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EquipmentLoan>, sqlx::Error> {
        let query = format!("SELECT {LOAN_COLUMNS} FROM equipment_loans WHERE id = $1");
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<EquipmentLoan>, sqlx::Error> {
        let query = format!("SELECT {LOAN_COLUMNS} FROM equipment_loans WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List loans, optionally filtered by status and borrower.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        borrower_id: Option<DbId>,
    ) -> Result<Vec<EquipmentLoan>, sqlx::Error> {
        let query = format!(
            "SELECT {LOAN_COLUMNS} FROM equipment_loans
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR borrower_id = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(status)
            .bind(borrower_id)
            .fetch_all(pool)
            .await
    }

    /// Record an approve/reject/cancel decision.
    pub async fn record_decision(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
        decided_by: DbId,
        notes: Option<&str>,
    ) -> Result<EquipmentLoan, sqlx::Error> {
        let query = format!(
            "UPDATE equipment_loans SET
                status = $2, decided_by = $3, decided_at = NOW(), decision_notes = $4
             WHERE id = $1
             RETURNING {LOAN_COLUMNS}"
        );
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(id)
            .bind(status)
            .bind(decided_by)
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    pub async fn mark_returned(
        conn: &mut PgConnection,
        id: DbId,
        condition: Option<&str>,
    ) -> Result<EquipmentLoan, sqlx::Error> {
        let query = format!(
            "UPDATE equipment_loans SET
                status = 'returned', returned_at = NOW(), return_condition = $2
             WHERE id = $1
             RETURNING {LOAN_COLUMNS}"
        );
        sqlx::query_as::<_, EquipmentLoan>(&query)
            .bind(id)
            .bind(condition)
            .fetch_one(conn)
            .await
    }
}
