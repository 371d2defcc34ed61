//! Handlers for the `/programs` resource and its episodes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use studio_core::error::CoreError;
use studio_core::roles::PROGRAM_MANAGER_ROLES;
use studio_core::types::DbId;
use studio_db::models::episode::{CreateEpisode, Episode};
use studio_db::models::program::{CreateProgram, Program, UpdateProgram};
use studio_db::models::work_item::WorkItem;
use studio_db::repositories::{EpisodeRepo, ProgramRepo};

use crate::engine::pipeline;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_role;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `POST /programs/{id}/episodes`: the new episode and the
/// work item handed to the first department.
#[derive(Debug, Serialize)]
pub struct StartedEpisode {
    pub episode: Episode,
    pub work_item: WorkItem,
}

fn program_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Program", id })
}

fn require_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Program name must not be empty".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/programs
pub async fn list_programs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Program>>>> {
    let programs = ProgramRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse::new(programs)))
}

/// POST /api/v1/programs
pub async fn create_program(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProgram>,
) -> AppResult<(StatusCode, Json<DataResponse<Program>>)> {
    require_role(&auth, PROGRAM_MANAGER_ROLES)?;
    require_name(&input.name)?;

    let program = ProgramRepo::create(&state.pool, &input, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, program_id = program.id, "Program created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(program))))
}

/// GET /api/v1/programs/{id}
pub async fn get_program(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Program>>> {
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| program_not_found(id))?;
    Ok(Json(DataResponse::new(program)))
}

/// PUT /api/v1/programs/{id}
pub async fn update_program(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProgram>,
) -> AppResult<Json<DataResponse<Program>>> {
    require_role(&auth, PROGRAM_MANAGER_ROLES)?;
    if let Some(name) = &input.name {
        require_name(name)?;
    }

    let program = ProgramRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| program_not_found(id))?;
    tracing::info!(user_id = auth.user_id, program_id = id, "Program updated");
    Ok(Json(DataResponse::new(program)))
}

/// GET /api/v1/programs/{id}/episodes
pub async fn list_episodes(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Episode>>>> {
    ProgramRepo::find_by_id(&state.pool, program_id)
        .await?
        .ok_or_else(|| program_not_found(program_id))?;
    let episodes = EpisodeRepo::list_for_program(&state.pool, program_id).await?;
    Ok(Json(DataResponse::new(episodes)))
}

/// POST /api/v1/programs/{id}/episodes
///
/// Creates the episode and starts its pipeline at the first department.
pub async fn create_episode(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
    Json(input): Json<CreateEpisode>,
) -> AppResult<(StatusCode, Json<DataResponse<StartedEpisode>>)> {
    require_role(&auth, PROGRAM_MANAGER_ROLES)?;
    if input.episode_number < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "Episode number must be positive".into(),
        )));
    }
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Episode title must not be empty".into(),
        )));
    }

    let (episode, work_item) =
        pipeline::start_episode(&state.pool, &state.event_bus, &auth, program_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(StartedEpisode { episode, work_item })),
    ))
}
