//! Repositories for `biometric_machines` and `attendance_logs`.

use sqlx::PgPool;
use studio_core::types::{DbId, Timestamp};

use crate::models::biometric::{
    AttendanceLog, BiometricMachine, CreateBiometricMachine, NewPunch, UpdateBiometricMachine,
};

const COLUMNS: &str = "id, name, ip_address, port, location, is_active, last_synced_at, \
                       last_sync_status, last_sync_error, created_at, updated_at";

/// Default port of the device HTTP gateway.
const DEFAULT_PORT: i32 = 80;

pub struct BiometricMachineRepo;

impl BiometricMachineRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateBiometricMachine,
    ) -> Result<BiometricMachine, sqlx::Error> {
        let query = format!(
            "INSERT INTO biometric_machines (name, ip_address, port, location)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BiometricMachine>(&query)
            .bind(&input.name)
            .bind(&input.ip_address)
            .bind(input.port.unwrap_or(DEFAULT_PORT))
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BiometricMachine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM biometric_machines WHERE id = $1");
        sqlx::query_as::<_, BiometricMachine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<BiometricMachine>, sqlx::Error> {
        let filter = if active_only {
            "WHERE is_active = true"
        } else {
            ""
        };
        let query = format!("SELECT {COLUMNS} FROM biometric_machines {filter} ORDER BY id ASC");
        sqlx::query_as::<_, BiometricMachine>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBiometricMachine,
    ) -> Result<Option<BiometricMachine>, sqlx::Error> {
        let query = format!(
            "UPDATE biometric_machines SET
                name = COALESCE($2, name),
                ip_address = COALESCE($3, ip_address),
                port = COALESCE($4, port),
                location = COALESCE($5, location),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BiometricMachine>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.ip_address)
            .bind(input.port)
            .bind(&input.location)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful sync up to `synced_at`.
    pub async fn record_sync_ok(
        pool: &PgPool,
        id: DbId,
        synced_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE biometric_machines SET
                last_synced_at = $2, last_sync_status = 'ok', last_sync_error = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(synced_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed sync. `last_synced_at` is left alone so the next run
    /// fetches the same window again.
    pub async fn record_sync_failure(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE biometric_machines SET last_sync_status = 'failed', last_sync_error = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}

const LOG_COLUMNS: &str =
    "id, machine_id, employee_id, biometric_pin, punched_at, verify_mode, created_at";

pub struct AttendanceLogRepo;

impl AttendanceLogRepo {
    /// Insert raw punches, skipping ones already stored.
    ///
    /// The employee is resolved from the PIN at insert time. Returns the
    /// number of new rows.
    pub async fn insert_batch(
        pool: &PgPool,
        machine_id: DbId,
        punches: &[NewPunch],
    ) -> Result<u64, sqlx::Error> {
        if punches.is_empty() {
            return Ok(0);
        }
        let pins: Vec<String> = punches.iter().map(|p| p.biometric_pin.clone()).collect();
        let times: Vec<Timestamp> = punches.iter().map(|p| p.punched_at).collect();
        let modes: Vec<Option<String>> = punches.iter().map(|p| p.verify_mode.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO attendance_logs (machine_id, employee_id, biometric_pin, punched_at, verify_mode)
             SELECT $1, e.id, p.pin, p.punched_at, p.verify_mode
             FROM UNNEST($2::text[], $3::timestamptz[], $4::text[]) AS p(pin, punched_at, verify_mode)
             LEFT JOIN employees e ON e.biometric_pin = p.pin
             ON CONFLICT ON CONSTRAINT uq_attendance_logs_punch DO NOTHING",
        )
        .bind(machine_id)
        .bind(&pins)
        .bind(&times)
        .bind(&modes)
        .execute(pool)
        .await?;

        let inserted = result.rows_affected();
        tracing::debug!(
            machine_id,
            received = punches.len(),
            inserted,
            "Stored attendance punches"
        );
        Ok(inserted)
    }

    /// Every punch of one employee (from any machine) in `[from, to)`.
    pub async fn punches_for_employee(
        pool: &PgPool,
        employee_id: DbId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT punched_at FROM attendance_logs
             WHERE employee_id = $1 AND punched_at >= $2 AND punched_at < $3
             ORDER BY punched_at ASC",
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_machine(
        pool: &PgPool,
        machine_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AttendanceLog>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM attendance_logs
             WHERE machine_id = $1
             ORDER BY punched_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AttendanceLog>(&query)
            .bind(machine_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
