//! Handlers for the `/work-items` resource.
//!
//! State changes go through [`pipeline::apply_action`]; this module only
//! parses requests and shapes responses.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use studio_core::department::Department;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_core::workflow::{WorkAction, WorkStatus};
use studio_db::models::episode::Episode;
use studio_db::models::work_item::{WorkItem, WorkItemFilter, WorkReview};
use studio_db::repositories::{WorkItemRepo, WorkReviewRepo};

use crate::engine::pipeline::{self, ActionOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkItemQuery {
    pub department: Option<String>,
    pub status: Option<String>,
    pub episode_id: Option<DbId>,
    /// Only items assigned to the caller.
    #[serde(default)]
    pub mine: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    pub notes: Option<String>,
}

/// Response body for a work item action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub work_item: WorkItem,
    pub episode: Episode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_work_item: Option<WorkItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopened_work_item: Option<WorkItem>,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            work_item: outcome.item,
            episode: outcome.episode,
            next_work_item: outcome.handed_off_to,
            reopened_work_item: outcome.reopened,
        }
    }
}

/// GET /api/v1/work-items
pub async fn list_work_items(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WorkItemQuery>,
) -> AppResult<Json<DataResponse<Vec<WorkItem>>>> {
    if let Some(dept) = &params.department {
        Department::parse(dept).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown department '{dept}'")))
        })?;
    }
    if let Some(status) = &params.status {
        WorkStatus::parse(status).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown work status '{status}'"
            )))
        })?;
    }

    let filter = WorkItemFilter {
        department: params.department,
        status: params.status,
        episode_id: params.episode_id,
        assigned_to: params.mine.then_some(auth.user_id),
    };
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let items = WorkItemRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse::new(items)))
}

/// GET /api/v1/work-items/{id}
pub async fn get_work_item(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkItem>>> {
    let item = WorkItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkItem",
            id,
        }))?;
    Ok(Json(DataResponse::new(item)))
}

/// PATCH /api/v1/work-items/{id}/details
///
/// Shallow-merges the body into the stored detail object.
pub async fn update_details(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<WorkItem>>> {
    let item = pipeline::update_details(&state.pool, &auth, id, &patch).await?;
    Ok(Json(DataResponse::new(item)))
}

/// GET /api/v1/work-items/{id}/reviews
pub async fn list_reviews(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<WorkReview>>>> {
    WorkItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkItem",
            id,
        }))?;
    let reviews = WorkReviewRepo::list_for_item(&state.pool, id).await?;
    Ok(Json(DataResponse::new(reviews)))
}

async fn run_action(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    action: WorkAction,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let outcome = pipeline::apply_action(
        &state.pool,
        &state.event_bus,
        auth,
        id,
        action,
        input.notes.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse::new(outcome.into())))
}

/// POST /api/v1/work-items/{id}/accept
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Accept, body).await
}

/// POST /api/v1/work-items/{id}/submit
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Submit, body).await
}

/// POST /api/v1/work-items/{id}/approve
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Approve, body).await
}

/// POST /api/v1/work-items/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Reject, body).await
}

/// POST /api/v1/work-items/{id}/complete
pub async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Complete, body).await
}

/// POST /api/v1/work-items/{id}/resume
pub async fn resume(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ActionRequest>>,
) -> AppResult<Json<DataResponse<ActionResponse>>> {
    run_action(&state, &auth, id, WorkAction::Resume, body).await
}
