//! Handlers for the `/leave-requests` and `/leave-balance` resources.
//!
//! Annual leave is checked against the yearly quota twice: at request time
//! counting pending requests, and again at approval counting only approved
//! ones. Both checks, and the overlap check, hold the employee row lock.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgConnection;
use studio_core::attendance::{AttendanceSource, AttendanceStatus};
use studio_core::calendar::{dates_in_range, is_working_day, working_days, year_bounds};
use studio_core::error::CoreError;
use studio_core::leave::{
    check_quota, leave_transition, validate_leave_range, LeaveAction, LeaveStatus, LeaveType,
};
use studio_core::notification::{self, ENTITY_LEAVE_REQUEST};
use studio_core::roles::HR_ROLES;
use studio_core::types::DbId;
use studio_db::models::employee::Employee;
use studio_db::models::leave::{CreateLeaveRequest, LeaveRequest};
use studio_db::repositories::{
    AttendanceRepo, EmployeeRepo, HolidayRepo, LeaveRepo, NotificationRepo,
};
use studio_events::{names, PlatformEvent};

use super::attendance::employee_for;
use crate::engine::notify::{linked, notify_user};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaveQuery {
    pub status: Option<String>,
    pub employee_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct LeaveBalance {
    pub employee_id: DbId,
    pub year: i32,
    pub quota: i32,
    pub used: i32,
    pub pending: i32,
    pub remaining: i32,
}

fn parse_leave_type(value: &str) -> AppResult<LeaveType> {
    LeaveType::parse(value).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Unknown leave type '{value}'")))
    })
}

fn parse_leave_status(request: &LeaveRequest) -> AppResult<LeaveStatus> {
    LeaveStatus::parse(&request.status).ok_or_else(|| {
        AppError::InternalError(format!(
            "Leave request {} has unknown status '{}'",
            request.id, request.status
        ))
    })
}

async fn lock_request(conn: &mut PgConnection, id: DbId) -> AppResult<LeaveRequest> {
    LeaveRepo::lock(conn, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LeaveRequest",
            id,
        }))
}

async fn lock_employee(conn: &mut PgConnection, id: DbId) -> AppResult<Employee> {
    EmployeeRepo::lock(conn, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))
}

/// POST /api/v1/leave-requests
pub async fn create_leave_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateLeaveRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LeaveRequest>>)> {
    let employee = employee_for(&state, &auth).await?;
    let leave_type = parse_leave_type(&input.leave_type)?;
    let today = state.config.schedule.local_date(Utc::now());
    validate_leave_range(input.start_date, input.end_date, today)?;
    if leave_type.counts_against_quota() && input.start_date.year() != input.end_date.year() {
        return Err(AppError::Core(CoreError::Validation(
            "Annual leave cannot span two calendar years; split the request".into(),
        )));
    }

    let holidays =
        HolidayRepo::dates_between(&state.pool, input.start_date, input.end_date).await?;
    let days = working_days(input.start_date, input.end_date, &holidays);
    if days == 0 {
        return Err(AppError::Core(CoreError::Validation(
            "The requested range contains no working days".into(),
        )));
    }

    // The employee lock serialises concurrent requests of the same person,
    // so the overlap and quota checks see every earlier request.
    let mut tx = state.pool.begin().await?;
    let locked = lock_employee(&mut tx, employee.id).await?;
    if LeaveRepo::overlaps(&mut tx, employee.id, input.start_date, input.end_date).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "The requested range overlaps an existing leave request".into(),
        )));
    }
    if leave_type.counts_against_quota() {
        let used = LeaveRepo::used_annual_days(&mut tx, employee.id, input.start_date.year(), true)
            .await?;
        check_quota(locked.annual_leave_quota, used, days)?;
    }
    let request = LeaveRepo::create(&mut tx, employee.id, &input, days).await?;
    let content = notification::leave_requested(
        &employee.full_name,
        leave_type.as_str(),
        request.start_date,
        request.end_date,
    );
    NotificationRepo::notify_roles(
        &mut tx,
        HR_ROLES,
        Some(auth.user_id),
        &linked(&content, ENTITY_LEAVE_REQUEST, request.id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        employee_id = employee.id,
        leave_request_id = request.id,
        leave_type = %leave_type,
        days,
        "Leave requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(request))))
}

/// GET /api/v1/leave-requests
pub async fn list_leave_requests(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<LeaveQuery>,
) -> AppResult<Json<DataResponse<Vec<LeaveRequest>>>> {
    if let Some(status) = &params.status {
        LeaveStatus::parse(status).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown leave status '{status}'"
            )))
        })?;
    }
    let requests =
        LeaveRepo::list(&state.pool, params.status.as_deref(), params.employee_id).await?;
    Ok(Json(DataResponse::new(requests)))
}

/// GET /api/v1/leave-requests/mine
pub async fn my_leave_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LeaveRequest>>>> {
    let employee = employee_for(&state, &auth).await?;
    let requests = LeaveRepo::list(&state.pool, None, Some(employee.id)).await?;
    Ok(Json(DataResponse::new(requests)))
}

/// POST /api/v1/leave-requests/{id}/approve
///
/// Marks every working day of the leave as `on_leave` in attendance.
pub async fn approve_leave_request(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReviewRequest>>,
) -> AppResult<Json<DataResponse<LeaveRequest>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let existing = LeaveRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LeaveRequest",
            id,
        }))?;
    let holidays =
        HolidayRepo::dates_between(&state.pool, existing.start_date, existing.end_date).await?;

    let mut tx = state.pool.begin().await?;
    let employee = lock_employee(&mut tx, existing.employee_id).await?;
    let request = lock_request(&mut tx, id).await?;
    let to = leave_transition(parse_leave_status(&request)?, LeaveAction::Approve)?;

    if parse_leave_type(&request.leave_type)?.counts_against_quota() {
        let used = LeaveRepo::used_annual_days(
            &mut tx,
            employee.id,
            request.start_date.year(),
            false,
        )
        .await?;
        check_quota(employee.annual_leave_quota, used, request.days)?;
    }

    let note = format!("Leave request #{id}");
    let mut days_marked = 0;
    for date in dates_in_range(request.start_date, request.end_date) {
        if !is_working_day(date, &holidays) {
            continue;
        }
        if AttendanceRepo::upsert_status(
            &mut tx,
            employee.id,
            date,
            AttendanceStatus::OnLeave.as_str(),
            AttendanceSource::System.as_str(),
            Some(&note),
        )
        .await?
        {
            days_marked += 1;
        }
    }

    let request = LeaveRepo::record_decision(
        &mut tx,
        id,
        to.as_str(),
        hr.user_id,
        input.notes.as_deref(),
    )
    .await?;
    let content = notification::leave_decided(request.start_date, request.end_date, true);
    notify_user(
        &mut tx,
        employee.user_id,
        hr.user_id,
        &linked(&content, ENTITY_LEAVE_REQUEST, id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = hr.user_id,
        employee_id = employee.id,
        leave_request_id = id,
        days_marked,
        "Leave approved"
    );
    state.event_bus.publish(
        PlatformEvent::new(names::LEAVE_APPROVED)
            .with_source(names::ENTITY_LEAVE_REQUEST, id)
            .with_actor(hr.user_id)
            .with_payload(json!({
                "employee_id": employee.id,
                "leave_type": request.leave_type,
                "start_date": request.start_date,
                "end_date": request.end_date,
                "days": request.days,
            })),
    );
    Ok(Json(DataResponse::new(request)))
}

/// POST /api/v1/leave-requests/{id}/reject
pub async fn reject_leave_request(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReviewRequest>>,
) -> AppResult<Json<DataResponse<LeaveRequest>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();

    let mut tx = state.pool.begin().await?;
    let request = lock_request(&mut tx, id).await?;
    let to = leave_transition(parse_leave_status(&request)?, LeaveAction::Reject)?;
    let request = LeaveRepo::record_decision(
        &mut tx,
        id,
        to.as_str(),
        hr.user_id,
        input.notes.as_deref(),
    )
    .await?;

    let employee = EmployeeRepo::find_by_id(&state.pool, request.employee_id).await?;
    let content = notification::leave_decided(request.start_date, request.end_date, false);
    notify_user(
        &mut tx,
        employee.and_then(|e| e.user_id),
        hr.user_id,
        &linked(&content, ENTITY_LEAVE_REQUEST, id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = hr.user_id, leave_request_id = id, "Leave rejected");
    Ok(Json(DataResponse::new(request)))
}

/// POST /api/v1/leave-requests/{id}/cancel
///
/// Only the requesting employee may cancel, and only while pending.
pub async fn cancel_leave_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LeaveRequest>>> {
    let employee = employee_for(&state, &auth).await?;

    let mut tx = state.pool.begin().await?;
    let request = lock_request(&mut tx, id).await?;
    if request.employee_id != employee.id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the requesting employee can cancel a leave request".into(),
        )));
    }
    let to = leave_transition(parse_leave_status(&request)?, LeaveAction::Cancel)?;
    let request =
        LeaveRepo::record_decision(&mut tx, id, to.as_str(), auth.user_id, None).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        employee_id = employee.id,
        leave_request_id = id,
        "Leave cancelled"
    );
    Ok(Json(DataResponse::new(request)))
}

/// GET /api/v1/leave-balance/me
pub async fn my_leave_balance(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BalanceQuery>,
) -> AppResult<Json<DataResponse<LeaveBalance>>> {
    let employee = employee_for(&state, &auth).await?;
    let year = params
        .year
        .unwrap_or_else(|| state.config.schedule.local_date(Utc::now()).year());
    year_bounds(year)?;

    let mut conn = state.pool.acquire().await?;
    let used = LeaveRepo::used_annual_days(&mut conn, employee.id, year, false).await?;
    let committed = LeaveRepo::used_annual_days(&mut conn, employee.id, year, true).await?;

    Ok(Json(DataResponse::new(LeaveBalance {
        employee_id: employee.id,
        year,
        quota: employee.annual_leave_quota,
        used,
        pending: committed - used,
        remaining: employee.annual_leave_quota - committed,
    })))
}
