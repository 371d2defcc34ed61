//! Login, refresh, logout and admin user management over HTTP.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_employee, create_user, delete_auth, expect_json, get_auth, post_json,
    post_json_auth, put_json_auth, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(pool: &PgPool, username: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_role(pool: PgPool) {
    let user = create_user(&pool, "producer1", "producer").await;

    let json = expect_json(login(&pool, "producer1", TEST_PASSWORD).await, StatusCode::OK).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["id"], user.id());
    assert_eq!(json["user"]["role"], "producer");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_by_email_reports_department(pool: PgPool) {
    let user = create_user(&pool, "cutter", "editor").await;

    let json = expect_json(
        login(&pool, "CUTTER@studio.test", TEST_PASSWORD).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["user"]["id"], user.id());
    assert_eq!(json["user"]["department"], "editing");

    let response = login(&pool, "hr_lead", TEST_PASSWORD).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_unauthorized(pool: PgPool) {
    create_user(&pool, "someone", "employee").await;
    let response = login(&pool, "someone", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_repeated_failures(pool: PgPool) {
    create_user(&pool, "locked", "employee").await;
    for _ in 0..5 {
        let response = login(&pool, "locked", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while the lock holds.
    let response = login(&pool, "locked", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    create_user(&pool, "rotator", "employee").await;
    let first = body_json(login(&pool, "rotator", TEST_PASSWORD).await).await;
    let token = first["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": token })).await;
    let second = expect_json(response, StatusCode::OK).await;
    assert_ne!(second["refresh_token"].as_str().unwrap(), token);

    // The old token was revoked by the rotation.
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": token })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_includes_linked_employee(pool: PgPool) {
    let user = create_user(&pool, "staff", "employee").await;
    let employee_id = create_employee(&pool, &user, "EMP-001").await;

    let app = common::build_test_app(pool);
    let json = expect_json(get_auth(app, "/api/v1/auth/me", &user.token).await, StatusCode::OK).await;
    assert_eq!(json["username"], "staff");
    assert_eq!(json["employee_id"], employee_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_manages_users(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin.token,
        json!({
            "username": "new_editor",
            "email": "editor@studio.test",
            "full_name": "New Editor",
            "password": "a-long-enough-password",
            "role": "editor"
        }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(created["role"], "editor");
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{id}"),
        &admin.token,
        json!({ "role": "sound_engineer" }),
    )
    .await;
    let updated = expect_json(response, StatusCode::OK).await;
    assert_eq!(updated["role"], "sound_engineer");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/users/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = login(&pool, "new_editor", "a-long-enough-password").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_rejects_unknown_role_and_short_password(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin.token,
        json!({
            "username": "ghost",
            "email": "ghost@studio.test",
            "full_name": "Ghost",
            "password": "a-long-enough-password",
            "role": "astronaut"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin.token,
        json!({
            "username": "ghost",
            "email": "ghost@studio.test",
            "full_name": "Ghost",
            "password": "short",
            "role": "editor"
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admins_cannot_manage_users(pool: PgPool) {
    let hr = create_user(&pool, "hr1", "hr").await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &hr.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_filters_staff_by_department(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;
    create_user(&pool, "cutter", "editor").await;
    create_user(&pool, "mixer", "sound_engineer").await;
    create_user(&pool, "people", "hr").await;

    let list = |uri: &'static str| {
        let app = common::build_test_app(pool.clone());
        let token = admin.token.clone();
        async move { get_auth(app, uri, &token).await }
    };

    let response = list("/api/v1/admin/users?department=editing").await;
    let json = expect_json(response, StatusCode::OK).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cutter"]);

    let json = expect_json(list("/api/v1/admin/users?q=MIX").await, StatusCode::OK).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["role"], "sound_engineer");

    let response = list("/api/v1/admin/users?department=editing&role=hr").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = list("/api/v1/admin/users?department=catering").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
