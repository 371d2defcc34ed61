//! Repository for the `employees` table.

use sqlx::{PgConnection, PgPool};
use studio_core::leave::DEFAULT_ANNUAL_QUOTA;
use studio_core::types::DbId;

use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};

const COLUMNS: &str = "id, user_id, employee_number, full_name, department, position, \
                       biometric_pin, hire_date, annual_leave_quota, is_active, created_at, updated_at";

pub struct EmployeeRepo;

impl EmployeeRepo {
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (user_id, employee_number, full_name, department, position,
                                    biometric_pin, hire_date, annual_leave_quota)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(input.user_id)
            .bind(&input.employee_number)
            .bind(&input.full_name)
            .bind(&input.department)
            .bind(&input.position)
            .bind(&input.biometric_pin)
            .bind(input.hire_date)
            .bind(input.annual_leave_quota.unwrap_or(DEFAULT_ANNUAL_QUOTA))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The employee record linked to a login, if any.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE user_id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Serialize work on one employee (e.g. leave approval) within a transaction.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Employee>, sqlx::Error> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = true"
        };
        let query = format!("SELECT {COLUMNS} FROM employees {filter} ORDER BY full_name ASC, id ASC");
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }

    /// Map of biometric PIN to employee ID for the given PINs.
    pub async fn ids_by_pins(
        pool: &PgPool,
        pins: &[String],
    ) -> Result<Vec<(String, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT biometric_pin, id FROM employees \
             WHERE biometric_pin = ANY($1) AND biometric_pin IS NOT NULL",
        )
        .bind(pins)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployee,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                user_id = COALESCE($2, user_id),
                full_name = COALESCE($3, full_name),
                department = COALESCE($4, department),
                position = COALESCE($5, position),
                biometric_pin = COALESCE($6, biometric_pin),
                hire_date = COALESCE($7, hire_date),
                annual_leave_quota = COALESCE($8, annual_leave_quota),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(input.user_id)
            .bind(&input.full_name)
            .bind(&input.department)
            .bind(&input.position)
            .bind(&input.biometric_pin)
            .bind(input.hire_date)
            .bind(input.annual_leave_quota)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
