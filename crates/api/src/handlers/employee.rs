//! Handlers for the `/employees` resource (HR only).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::employee::{validate_biometric_pin, validate_employee_number};
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use studio_db::repositories::EmployeeRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireHr;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_quota(quota: Option<i32>) -> AppResult<()> {
    if quota.is_some_and(|q| q < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Annual leave quota cannot be negative".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/employees
pub async fn list_employees(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Employee>>>> {
    let employees = EmployeeRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse::new(employees)))
}

/// POST /api/v1/employees
pub async fn create_employee(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<DataResponse<Employee>>)> {
    validate_employee_number(&input.employee_number)?;
    if let Some(pin) = &input.biometric_pin {
        validate_biometric_pin(pin)?;
    }
    if input.full_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Employee name must not be empty".into(),
        )));
    }
    validate_quota(input.annual_leave_quota)?;

    let employee = EmployeeRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = hr.user_id,
        employee_id = employee.id,
        employee_number = %employee.employee_number,
        "Employee created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(employee))))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Employee>>> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;
    Ok(Json(DataResponse::new(employee)))
}

/// PUT /api/v1/employees/{id}
pub async fn update_employee(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<Json<DataResponse<Employee>>> {
    if let Some(pin) = &input.biometric_pin {
        validate_biometric_pin(pin)?;
    }
    validate_quota(input.annual_leave_quota)?;

    let employee = EmployeeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;
    tracing::info!(user_id = hr.user_id, employee_id = id, "Employee updated");
    Ok(Json(DataResponse::new(employee)))
}
