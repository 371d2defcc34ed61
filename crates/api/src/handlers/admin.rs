//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use studio_core::department::Department;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::role::Role;
use studio_db::models::user::{CreateUser, UpdateUser, UserFilter, UserResponse};
use studio_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub password: String,
    /// Role name, e.g. `"editor"`.
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

async fn role_id_for(state: &AppState, name: &str) -> AppResult<DbId> {
    RoleRepo::find_by_name(&state.pool, name)
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{name}'"))))
}

fn hash_new_password(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    let password_hash = hash_new_password(&input.password)?;
    let role_id = role_id_for(&state, &input.role).await?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            password_hash,
            role_id,
        },
    )
    .await?;
    tracing::info!(admin_id = admin.user_id, user_id = user.id, role = %input.role, "User created");

    let response = UserRepo::find_response(&state.pool, user.id)
        .await?
        .ok_or_else(|| user_not_found(user.id))?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    /// Staff of one pipeline department, e.g. `editing`.
    pub department: Option<String>,
    pub active: Option<bool>,
    pub q: Option<String>,
}

/// GET /api/v1/admin/users?role=&department=&active=&q=
///
/// `department` selects that department's worker role and cannot be
/// combined with `role`.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let role = match (query.role, query.department.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(AppError::Core(CoreError::Validation(
                "Filter by role or by department, not both".into(),
            )));
        }
        (role, None) => role,
        (None, Some(name)) => {
            let department = Department::parse(name).ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!("Unknown department '{name}'")))
            })?;
            Some(department.worker_role().to_string())
        }
    };
    let filter = UserFilter {
        role,
        is_active: query.active,
        search: query.q.filter(|q| !q.trim().is_empty()),
    };
    Ok(Json(UserRepo::list(&state.pool, &filter).await?))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(user))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;
    let role_id = match input.role.as_deref() {
        Some(name) => Some(role_id_for(&state, name).await?),
        None => None,
    };
    let deactivating = input.is_active == Some(false);

    UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            role_id,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or_else(|| user_not_found(id))?;

    // Role changes take effect on the next login.
    if role_id.is_some() || deactivating {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }
    tracing::info!(admin_id = admin.user_id, user_id = id, "User updated");

    let response = UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(response))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivates the user and revokes their sessions. Returns 204.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Administrators cannot deactivate themselves".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(user_not_found(id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    let password_hash = hash_new_password(&input.new_password)?;
    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(user_not_found(id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    Ok(Json(DataResponse::new(RoleRepo::list(&state.pool).await?)))
}
