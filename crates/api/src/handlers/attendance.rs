//! Handlers for the `/attendance` resource.
//!
//! Employees check in and out for themselves through the web; HR lists and
//! corrects records. Machine punches arrive through the biometric sync.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use studio_core::attendance::{
    evaluate_check_in, summarize, work_minutes, AttendanceStatus, AttendanceSummary, DayTotals,
};
use studio_core::calendar::month_bounds;
use studio_core::error::CoreError;
use studio_core::roles::{has_any_role, HR_ROLES};
use studio_core::types::DbId;
use studio_db::models::attendance::{Attendance, AttendanceWithEmployee, CorrectAttendance};
use studio_db::models::employee::Employee;
use studio_db::repositories::{AttendanceRepo, EmployeeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHr;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttendanceListQuery {
    pub employee_id: Option<DbId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub employee_id: Option<DbId>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub employee_id: DbId,
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub summary: AttendanceSummary,
}

/// The employee record linked to the caller's user account.
pub(crate) async fn employee_for(state: &AppState, auth: &AuthUser) -> AppResult<Employee> {
    let employee = EmployeeRepo::find_by_user_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "No employee record is linked to this account".into(),
            ))
        })?;
    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Employee record is inactive".into(),
        )));
    }
    Ok(employee)
}

/// Resolve an optional `from`/`to` window, defaulting to the month of `today`.
fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let (month_start, month_end) = month_bounds(today.year(), today.month())?;
    let from = from.unwrap_or(month_start);
    let to = to.unwrap_or(month_end);
    if to < from {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Range end {to} is before range start {from}"
        ))));
    }
    Ok((from, to))
}

fn today(state: &AppState) -> NaiveDate {
    state.config.schedule.local_date(Utc::now())
}

/// POST /api/v1/attendance/check-in
pub async fn check_in(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Attendance>>> {
    let employee = employee_for(&state, &auth).await?;
    let schedule = &state.config.schedule;
    let now = Utc::now();
    let local = schedule.to_local(now);
    let eval = evaluate_check_in(schedule, local.time());

    let record = AttendanceRepo::record_check_in(
        &state.pool,
        employee.id,
        local.date(),
        now,
        eval.status.as_str(),
        eval.late_minutes,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Already checked in on {}",
            local.date()
        )))
    })?;

    tracing::info!(
        user_id = auth.user_id,
        employee_id = employee.id,
        status = %eval.status,
        late_minutes = eval.late_minutes,
        "Checked in"
    );
    Ok(Json(DataResponse::new(record)))
}

/// POST /api/v1/attendance/check-out
pub async fn check_out(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Attendance>>> {
    let employee = employee_for(&state, &auth).await?;
    let now = Utc::now();
    let date = state.config.schedule.local_date(now);

    let existing = AttendanceRepo::find_for_day(&state.pool, employee.id, date).await?;
    let (id, checked_in) = match existing {
        Some(Attendance {
            id,
            check_in: Some(check_in),
            check_out: None,
            ..
        }) => (id, check_in),
        Some(Attendance {
            check_out: Some(_), ..
        }) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Already checked out on {date}"
            ))))
        }
        _ => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "No check-in recorded on {date}"
            ))))
        }
    };

    let minutes = work_minutes(checked_in, now);
    let record = AttendanceRepo::record_check_out(&state.pool, id, now, minutes)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Already checked out on {date}"
            )))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        employee_id = employee.id,
        work_minutes = minutes,
        "Checked out"
    );
    Ok(Json(DataResponse::new(record)))
}

/// GET /api/v1/attendance/me
pub async fn my_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<Attendance>>>> {
    let employee = employee_for(&state, &auth).await?;
    let (from, to) = resolve_range(params.from, params.to, today(&state))?;
    let records = AttendanceRepo::list_for_employee(&state.pool, employee.id, from, to).await?;
    Ok(Json(DataResponse::new(records)))
}

/// GET /api/v1/attendance
pub async fn list_attendance(
    RequireHr(_hr): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<AttendanceListQuery>,
) -> AppResult<Json<DataResponse<Vec<AttendanceWithEmployee>>>> {
    let (from, to) = resolve_range(params.from, params.to, today(&state))?;
    let records = AttendanceRepo::list(&state.pool, params.employee_id, from, to).await?;
    Ok(Json(DataResponse::new(records)))
}

/// PUT /api/v1/attendance/{id}
///
/// Manual corrections are marked with source `manual` and are never
/// overwritten by a machine sync.
pub async fn correct_attendance(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CorrectAttendance>,
) -> AppResult<Json<DataResponse<Attendance>>> {
    if let Some(status) = &input.status {
        AttendanceStatus::parse(status).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown attendance status '{status}'"
            )))
        })?;
    }
    if input.late_minutes.is_some_and(|m| m < 0) || input.work_minutes.is_some_and(|m| m < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Minutes cannot be negative".into(),
        )));
    }
    if let (Some(check_in), Some(check_out)) = (input.check_in, input.check_out) {
        if check_out < check_in {
            return Err(AppError::Core(CoreError::Validation(
                "Check-out cannot be before check-in".into(),
            )));
        }
    }

    let record = AttendanceRepo::correct(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attendance",
            id,
        }))?;
    tracing::info!(
        user_id = hr.user_id,
        attendance_id = id,
        employee_id = record.employee_id,
        "Attendance corrected"
    );
    Ok(Json(DataResponse::new(record)))
}

/// GET /api/v1/attendance/summary
///
/// Without `employee_id` the caller's own summary is returned. Other
/// employees' summaries require an HR role.
pub async fn attendance_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SummaryQuery>,
) -> AppResult<Json<DataResponse<SummaryResponse>>> {
    let employee_id = match params.employee_id {
        Some(id) => {
            let own = EmployeeRepo::find_by_user_id(&state.pool, auth.user_id)
                .await?
                .is_some_and(|e| e.id == id);
            if !own && !has_any_role(&auth.role, HR_ROLES) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only HR can view other employees' attendance".into(),
                )));
            }
            EmployeeRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Employee",
                    id,
                }))?
                .id
        }
        None => employee_for(&state, &auth).await?.id,
    };

    let current = today(&state);
    let year = params.year.unwrap_or(current.year());
    let month = params.month.unwrap_or(current.month());
    let (from, to) = month_bounds(year, month)?;

    let records = AttendanceRepo::list_for_employee(&state.pool, employee_id, from, to).await?;
    let summary = summarize(records.iter().filter_map(|r| {
        AttendanceStatus::parse(&r.status).map(|status| DayTotals {
            status,
            late_minutes: r.late_minutes,
            work_minutes: r.work_minutes,
        })
    }));

    Ok(Json(DataResponse::new(SummaryResponse {
        employee_id,
        year,
        month,
        summary,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_defaults_to_current_month() {
        let (from, to) = resolve_range(None, None, d(2026, 2, 10)).unwrap();
        assert_eq!(from, d(2026, 2, 1));
        assert_eq!(to, d(2026, 2, 28));
    }

    #[test]
    fn explicit_bounds_are_kept() {
        let (from, to) =
            resolve_range(Some(d(2026, 1, 5)), Some(d(2026, 3, 1)), d(2026, 2, 10)).unwrap();
        assert_eq!(from, d(2026, 1, 5));
        assert_eq!(to, d(2026, 3, 1));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(resolve_range(Some(d(2026, 2, 10)), Some(d(2026, 2, 9)), d(2026, 2, 10)).is_err());
    }
}
