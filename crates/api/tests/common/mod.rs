//! Shared helpers for the API integration tests.
//!
//! Every test gets a fresh database from `#[sqlx::test]`; the app is built
//! through [`build_app_router`] so the production middleware stack runs.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::NaiveTime;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use studio_api::auth::jwt::{sign_access_token, JwtConfig};
use studio_api::auth::password::hash_password;
use studio_api::config::ServerConfig;
use studio_api::router::build_app_router;
use studio_api::state::AppState;
use studio_core::attendance::WorkSchedule;
use studio_core::types::DbId;
use studio_db::models::employee::CreateEmployee;
use studio_db::models::user::{CreateUser, User};
use studio_db::repositories::{EmployeeRepo, RoleRepo, UserRepo};
use studio_events::EventBus;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-for-integration-tests".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// A schedule under which every check-in counts as on time, so results do
/// not depend on when the test runs.
pub fn lenient_schedule() -> WorkSchedule {
    WorkSchedule::new(
        NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        24 * 60,
        0,
    )
    .unwrap()
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt_config(),
        schedule: lenient_schedule(),
        device_timeout: Duration::from_secs(2),
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// A user created straight in the database, with a ready access token.
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> DbId {
        self.user.id
    }
}

pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> TestUser {
    let role_row = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("role '{role}' should be seeded"));
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@studio.test"),
            full_name: format!("Test {username}"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role_row.id,
        },
    )
    .await
    .unwrap();
    let token = sign_access_token(user.id, role, &test_jwt_config()).unwrap();
    TestUser { user, token }
}

/// Link an employee record to `user`.
pub async fn create_employee(pool: &PgPool, user: &TestUser, number: &str) -> DbId {
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            user_id: Some(user.id()),
            employee_number: number.to_string(),
            full_name: user.user.full_name.clone(),
            department: None,
            position: None,
            biometric_pin: None,
            hire_date: None,
            annual_leave_quota: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}
