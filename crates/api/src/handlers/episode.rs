//! Handlers for the `/episodes` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::episode::Episode;
use studio_db::models::event::Event;
use studio_db::models::work_item::WorkItem;
use studio_db::repositories::{EpisodeRepo, EventRepo, WorkItemRepo};
use studio_events::names;

use crate::engine::pipeline;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// An episode together with its per-department work items.
#[derive(Debug, Serialize)]
pub struct EpisodeDetail {
    #[serde(flatten)]
    pub episode: Episode,
    pub work_items: Vec<WorkItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelEpisodeRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/episodes/{id}
pub async fn get_episode(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EpisodeDetail>>> {
    let episode = EpisodeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Episode", id }))?;
    let work_items = WorkItemRepo::list_for_episode(&state.pool, id).await?;
    Ok(Json(DataResponse::new(EpisodeDetail {
        episode,
        work_items,
    })))
}

/// POST /api/v1/episodes/{id}/cancel
pub async fn cancel_episode(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<CancelEpisodeRequest>>,
) -> AppResult<Json<DataResponse<Episode>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let episode = pipeline::cancel_episode(
        &state.pool,
        &state.event_bus,
        &auth,
        id,
        input.reason.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse::new(episode)))
}

/// GET /api/v1/episodes/{id}/activity
///
/// Newest first.
pub async fn episode_activity(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ActivityQuery>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    EpisodeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Episode", id }))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let events = EventRepo::list_for_entity(&state.pool, names::ENTITY_EPISODE, id, limit).await?;
    Ok(Json(DataResponse::new(events)))
}
