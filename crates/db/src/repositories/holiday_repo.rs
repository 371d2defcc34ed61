//! Repository for the `holidays` table.

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgPool;
use studio_core::types::DbId;

use crate::models::holiday::{CreateHoliday, Holiday};

const COLUMNS: &str = "id, holiday_date, name, created_at, updated_at";

pub struct HolidayRepo;

impl HolidayRepo {
    pub async fn create(pool: &PgPool, input: &CreateHoliday) -> Result<Holiday, sqlx::Error> {
        let query = format!(
            "INSERT INTO holidays (holiday_date, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(input.holiday_date)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Holidays of one calendar year (or all when `year` is `None`).
    pub async fn list(pool: &PgPool, year: Option<i32>) -> Result<Vec<Holiday>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holidays
             WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM holiday_date)::int = $1)
             ORDER BY holiday_date ASC"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(year)
            .fetch_all(pool)
            .await
    }

    /// Holiday dates within an inclusive range.
    pub async fn dates_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, sqlx::Error> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT holiday_date FROM holidays WHERE holiday_date BETWEEN $1 AND $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
        Ok(dates.into_iter().collect())
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
