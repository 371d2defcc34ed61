//! Handlers for the `/holidays` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::holiday::{CreateHoliday, Holiday};
use studio_db::repositories::HolidayRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HolidayQuery {
    pub year: Option<i32>,
}

/// GET /api/v1/holidays
pub async fn list_holidays(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HolidayQuery>,
) -> AppResult<Json<DataResponse<Vec<Holiday>>>> {
    let holidays = HolidayRepo::list(&state.pool, params.year).await?;
    Ok(Json(DataResponse::new(holidays)))
}

/// POST /api/v1/holidays
pub async fn create_holiday(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateHoliday>,
) -> AppResult<(StatusCode, Json<DataResponse<Holiday>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Holiday name must not be empty".into(),
        )));
    }
    let holiday = HolidayRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = hr.user_id,
        holiday_id = holiday.id,
        date = %holiday.holiday_date,
        "Holiday created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(holiday))))
}

/// DELETE /api/v1/holidays/{id}
pub async fn delete_holiday(
    RequireHr(hr): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !HolidayRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Holiday",
            id,
        }));
    }
    tracing::info!(user_id = hr.user_id, holiday_id = id, "Holiday deleted");
    Ok(StatusCode::NO_CONTENT)
}
