//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use studio_core::department::Department;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_db::models::session::CreateSession;
use studio_db::models::user::{LoginUser, UserResponse};
use studio_db::repositories::{EmployeeRepo, RoleRepo, SessionRepo, UserRepo};

use crate::auth::jwt::{hash_refresh_token, sign_access_token, RefreshToken};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub role: String,
    /// Pipeline department the role works in, if any.
    pub department: Option<Department>,
}

/// `GET /auth/me` body: the user plus their HR record, if any.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub employee_id: Option<DbId>,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let LoginUser { user, role } = UserRepo::find_for_login(&state.pool, &input.username)
        .await?
        .ok_or_else(|| unauthorized("Invalid username or password"))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
        let locked =
            UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, lock_until)
                .await?;
        if locked {
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }
        return Err(unauthorized("Invalid username or password"));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, %role, "User logged in");

    let info = UserInfo {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        department: Department::for_role(&role),
        role,
    };
    let mut conn = state.pool.acquire().await?;
    let response = issue_tokens(&mut conn, &state, info, user_agent(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token: the presented session is revoked and a new one
/// issued.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let mut tx = state.pool.begin().await?;
    let session = SessionRepo::lock_active_by_hash(&mut tx, &token_hash)
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired refresh token"))?;
    SessionRepo::revoke(&mut tx, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let info = UserInfo {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        department: Department::for_role(&role),
        role,
    };
    let response = issue_tokens(&mut tx, &state, info, user_agent(&headers)).await?;
    tx.commit().await?;
    tracing::debug!(user_id = session.user_id, session_id = session.id, "Refresh token rotated");
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the user. Returns 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_response(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    let employee_id = EmployeeRepo::find_by_user_id(&state.pool, auth_user.user_id)
        .await?
        .map(|e| e.id);
    Ok(Json(MeResponse { user, employee_id }))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(255).collect())
}

/// Sign an access token and store a new refresh session on `conn`.
async fn issue_tokens(
    conn: &mut PgConnection,
    state: &AppState,
    user: UserInfo,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = sign_access_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    SessionRepo::create(
        conn,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent,
            ip_address: None,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: jwt.access_token_expiry_mins * 60,
        user,
    })
}
