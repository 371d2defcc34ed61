//! Pull punches from biometric machines and rebuild attendance days.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use studio_core::attendance::{evaluate_day, fold_punches, WorkSchedule};
use studio_core::types::{DbId, Timestamp};
use studio_db::models::biometric::{BiometricMachine, NewPunch};
use studio_db::repositories::{
    AttendanceLogRepo, AttendanceRepo, BiometricMachineRepo, EmployeeRepo,
};

use crate::config::WorkerConfig;
use crate::device::gateway::HttpDeviceGateway;
use crate::device::AttendanceDevice;

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub machine_id: DbId,
    pub fetched: usize,
    pub inserted: u64,
    pub days_rebuilt: usize,
    /// Newest punch seen; becomes the machine's `last_synced_at`.
    pub synced_up_to: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub machines: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: u64,
}

/// Sync every active machine. One machine failing does not stop the others.
pub async fn run_all(pool: &PgPool, config: &WorkerConfig) -> anyhow::Result<SyncReport> {
    let machines = BiometricMachineRepo::list(pool, true).await?;
    let mut report = SyncReport {
        machines: machines.len(),
        ..Default::default()
    };

    for machine in &machines {
        let result = match HttpDeviceGateway::for_machine(machine, config.device_timeout) {
            Ok(gateway) => sync_machine(pool, machine, &gateway, &config.schedule).await,
            Err(e) => {
                BiometricMachineRepo::record_sync_failure(pool, machine.id, &e.to_string()).await?;
                Err(e.into())
            }
        };
        match result {
            Ok(outcome) => {
                report.succeeded += 1;
                report.inserted += outcome.inserted;
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    machine_id = machine.id,
                    machine = %machine.name,
                    error = %format!("{e:#}"),
                    "Attendance sync failed for machine"
                );
            }
        }
    }

    tracing::info!(
        machines = report.machines,
        succeeded = report.succeeded,
        failed = report.failed,
        inserted = report.inserted,
        "Attendance sync finished"
    );
    Ok(report)
}

/// Sync one machine through `device` and record the outcome on the machine
/// row. A failed sync leaves `last_synced_at` unchanged.
pub async fn sync_machine(
    pool: &PgPool,
    machine: &BiometricMachine,
    device: &dyn AttendanceDevice,
    schedule: &WorkSchedule,
) -> anyhow::Result<SyncOutcome> {
    match pull(pool, machine, device, schedule).await {
        Ok(outcome) => {
            let synced_at = outcome
                .synced_up_to
                .or(machine.last_synced_at)
                .unwrap_or_else(Utc::now);
            BiometricMachineRepo::record_sync_ok(pool, machine.id, synced_at).await?;
            tracing::info!(
                machine_id = machine.id,
                fetched = outcome.fetched,
                inserted = outcome.inserted,
                days_rebuilt = outcome.days_rebuilt,
                "Machine synced"
            );
            Ok(outcome)
        }
        Err(e) => {
            let message = format!("{e:#}");
            if let Err(db_err) =
                BiometricMachineRepo::record_sync_failure(pool, machine.id, &message).await
            {
                tracing::error!(machine_id = machine.id, error = %db_err, "Failed to record sync failure");
            }
            Err(e)
        }
    }
}

async fn pull(
    pool: &PgPool,
    machine: &BiometricMachine,
    device: &dyn AttendanceDevice,
    schedule: &WorkSchedule,
) -> anyhow::Result<SyncOutcome> {
    let since = machine.last_synced_at.map(|ts| schedule.to_local(ts));
    let raw = device.fetch_punches(since).await?;

    let punches: Vec<NewPunch> = raw
        .into_iter()
        .map(|p| NewPunch {
            biometric_pin: p.pin.trim().to_string(),
            punched_at: schedule.from_local(p.timestamp),
            verify_mode: p.verify_mode,
        })
        .collect();

    let inserted = AttendanceLogRepo::insert_batch(pool, machine.id, &punches).await?;
    let days_rebuilt = rebuild_days(pool, schedule, &punches).await?;

    Ok(SyncOutcome {
        machine_id: machine.id,
        fetched: punches.len(),
        inserted,
        days_rebuilt,
        synced_up_to: punches.iter().map(|p| p.punched_at).max(),
    })
}

/// Recompute the attendance rows for every (employee, local day) touched by
/// `punches`, using all stored punches of that day from any machine.
async fn rebuild_days(
    pool: &PgPool,
    schedule: &WorkSchedule,
    punches: &[NewPunch],
) -> Result<usize, sqlx::Error> {
    if punches.is_empty() {
        return Ok(0);
    }

    let pins: Vec<String> = punches
        .iter()
        .map(|p| p.biometric_pin.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let employees: HashMap<String, DbId> =
        EmployeeRepo::ids_by_pins(pool, &pins).await?.into_iter().collect();

    let days: BTreeSet<(DbId, NaiveDate)> = punches
        .iter()
        .filter_map(|p| {
            employees
                .get(&p.biometric_pin)
                .map(|&id| (id, schedule.local_date(p.punched_at)))
        })
        .collect();

    let mut rebuilt = 0;
    for &(employee_id, date) in &days {
        let from = schedule.from_local(date.and_time(NaiveTime::MIN));
        let to = schedule.from_local((date + Duration::days(1)).and_time(NaiveTime::MIN));
        let stamps = AttendanceLogRepo::punches_for_employee(pool, employee_id, from, to).await?;

        let Some(day) = fold_punches(schedule, &stamps)
            .into_iter()
            .find(|d| d.date == date)
        else {
            continue;
        };

        let record = evaluate_day(schedule, &day);
        if AttendanceRepo::upsert_from_punches(pool, employee_id, &record).await? {
            rebuilt += 1;
        } else {
            tracing::debug!(employee_id, %date, "Kept manually corrected attendance");
        }
    }
    Ok(rebuilt)
}
