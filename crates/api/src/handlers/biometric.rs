//! Handlers for the `/biometric/machines` resource (HR only).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::biometric::{
    AttendanceLog, BiometricMachine, CreateBiometricMachine, UpdateBiometricMachine,
};
use studio_db::repositories::{AttendanceLogRepo, BiometricMachineRepo};
use studio_worker::device::gateway::HttpDeviceGateway;
use studio_worker::device::DeviceError;
use studio_worker::jobs::attendance_sync::{sync_machine, SyncOutcome};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireHr;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn machine_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "BiometricMachine",
        id,
    })
}

fn validate_address(ip_address: Option<&str>, port: Option<i32>) -> AppResult<()> {
    if ip_address.is_some_and(|ip| ip.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "Machine address must not be empty".into(),
        )));
    }
    if port.is_some_and(|p| !(1..=65535).contains(&p)) {
        return Err(AppError::Core(CoreError::Validation(
            "Port must be between 1 and 65535".into(),
        )));
    }
    Ok(())
}

/// Device failures surface as 502; anything else is internal.
fn sync_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<DeviceError>() {
        Some(device) => AppError::Upstream(device.to_string()),
        None => AppError::InternalError(format!("{err:#}")),
    }
}

/// GET /api/v1/biometric/machines
pub async fn list_machines(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BiometricMachine>>>> {
    let machines = BiometricMachineRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse::new(machines)))
}

/// POST /api/v1/biometric/machines
pub async fn create_machine(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateBiometricMachine>,
) -> AppResult<(StatusCode, Json<DataResponse<BiometricMachine>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Machine name must not be empty".into(),
        )));
    }
    validate_address(Some(&input.ip_address), input.port)?;

    let machine = BiometricMachineRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = hr.user_id,
        machine_id = machine.id,
        address = %format!("{}:{}", machine.ip_address, machine.port),
        "Biometric machine registered"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(machine))))
}

/// PUT /api/v1/biometric/machines/{id}
pub async fn update_machine(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBiometricMachine>,
) -> AppResult<Json<DataResponse<BiometricMachine>>> {
    validate_address(input.ip_address.as_deref(), input.port)?;
    let machine = BiometricMachineRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| machine_not_found(id))?;
    tracing::info!(user_id = hr.user_id, machine_id = id, "Biometric machine updated");
    Ok(Json(DataResponse::new(machine)))
}

/// POST /api/v1/biometric/machines/{id}/sync
///
/// Runs the same sync the worker runs on its interval, for one machine.
pub async fn sync_now(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SyncOutcome>>> {
    let machine = BiometricMachineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| machine_not_found(id))?;
    if !machine.is_active {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Machine '{}' is inactive",
            machine.name
        ))));
    }

    let gateway = match HttpDeviceGateway::for_machine(&machine, state.config.device_timeout) {
        Ok(gateway) => gateway,
        Err(e) => {
            BiometricMachineRepo::record_sync_failure(&state.pool, id, &e.to_string()).await?;
            return Err(AppError::Upstream(e.to_string()));
        }
    };

    tracing::info!(user_id = hr.user_id, machine_id = id, "Manual attendance sync requested");
    let outcome = sync_machine(&state.pool, &machine, &gateway, &state.config.schedule)
        .await
        .map_err(sync_error)?;
    Ok(Json(DataResponse::new(outcome)))
}

/// GET /api/v1/biometric/machines/{id}/logs
///
/// Raw punches, newest first.
pub async fn list_logs(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<AttendanceLog>>>> {
    BiometricMachineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| machine_not_found(id))?;
    let logs =
        AttendanceLogRepo::list_for_machine(&state.pool, id, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse::new(logs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_map_to_upstream() {
        let err = anyhow::Error::new(DeviceError::HttpStatus(503));
        assert!(matches!(sync_error(err), AppError::Upstream(_)));
    }

    #[test]
    fn other_sync_errors_are_internal() {
        let err = anyhow::anyhow!("database went away");
        assert!(matches!(sync_error(err), AppError::InternalError(_)));
    }

    #[test]
    fn port_range_is_checked() {
        assert!(validate_address(Some("10.0.0.5"), Some(80)).is_ok());
        assert!(validate_address(Some("10.0.0.5"), Some(0)).is_err());
        assert!(validate_address(Some(" "), None).is_err());
        assert!(validate_address(None, None).is_ok());
    }
}
