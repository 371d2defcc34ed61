//! Leave requests, approval and the annual balance over HTTP.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use common::{
    create_employee, create_user, expect_json, get_auth, post_auth, post_json_auth, TestUser,
};
use serde_json::json;
use sqlx::PgPool;
use studio_core::types::DbId;

/// A Monday at least two weeks out whose following three weeks stay in the
/// same calendar year.
fn future_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(14);
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    while (day + Duration::days(20)).year() != day.year() {
        day += Duration::days(7);
    }
    day
}

async fn request_leave(
    pool: &PgPool,
    user: &TestUser,
    leave_type: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/leave-requests",
        &user.token,
        json!({
            "leave_type": leave_type,
            "start_date": start,
            "end_date": end,
            "reason": "Family trip"
        }),
    )
    .await
}

async fn staff(pool: &PgPool) -> (TestUser, DbId) {
    let user = create_user(pool, "staff", "employee").await;
    let employee_id = create_employee(pool, &user, "EMP-100").await;
    (user, employee_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approved_leave_marks_attendance(pool: PgPool) {
    let hr = create_user(&pool, "people", "hr").await;
    let (user, employee_id) = staff(&pool).await;
    let monday = future_monday();
    // Monday through the following Monday: six working days.
    let end = monday + Duration::days(7);

    let created = expect_json(
        request_leave(&pool, &user, "annual", monday, end).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["data"]["status"], "pending");
    assert_eq!(created["data"]["days"], 6);
    let id = created["data"]["id"].as_i64().unwrap();

    // HR was notified of the request.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/notifications", &hr.token).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"][0]["kind"], "leave_requested");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/leave-requests/{id}/approve"),
        &hr.token,
        json!({ "notes": "Enjoy" }),
    )
    .await;
    let approved = expect_json(response, StatusCode::OK).await;
    assert_eq!(approved["data"]["status"], "approved");
    assert_eq!(approved["data"]["reviewed_by"], hr.id());

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/attendance?employee_id={employee_id}&from={monday}&to={end}"),
        &hr.token,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r["status"] == "on_leave" && r["source"] == "system"));

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/leave-balance/me?year={}", monday.year()),
        &user.token,
    )
    .await;
    let balance = expect_json(response, StatusCode::OK).await;
    assert_eq!(balance["data"]["quota"], 12);
    assert_eq!(balance["data"]["used"], 6);
    assert_eq!(balance["data"]["pending"], 0);
    assert_eq!(balance["data"]["remaining"], 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_requests_count_against_the_quota(pool: PgPool) {
    let (user, _) = staff(&pool).await;
    let monday = future_monday();

    for week in 0..2 {
        let start = monday + Duration::weeks(week);
        let response =
            request_leave(&pool, &user, "annual", start, start + Duration::days(4)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let third = monday + Duration::weeks(2);
    let json = expect_json(
        request_leave(&pool, &user, "annual", third, third + Duration::days(4)).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("2 day(s) remaining"));

    // Sick leave does not use the annual quota.
    let response = request_leave(&pool, &user, "sick", third, third + Duration::days(4)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/leave-balance/me?year={}", monday.year()),
        &user.token,
    )
    .await;
    let balance = expect_json(response, StatusCode::OK).await;
    assert_eq!(balance["data"]["used"], 0);
    assert_eq!(balance["data"]["pending"], 10);
    assert_eq!(balance["data"]["remaining"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_and_invalid_requests_are_refused(pool: PgPool) {
    let (user, _) = staff(&pool).await;
    let monday = future_monday();

    let response = request_leave(&pool, &user, "annual", monday, monday + Duration::days(2)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = request_leave(
        &pool,
        &user,
        "sick",
        monday + Duration::days(2),
        monday + Duration::days(3),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // End before start.
    let response = request_leave(&pool, &user, "annual", monday, monday - Duration::days(1)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A weekend has no working days.
    let saturday = monday + Duration::days(12);
    let response =
        request_leave(&pool, &user, "unpaid", saturday, saturday + Duration::days(1)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request_leave(&pool, &user, "sabbatical", monday, monday).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_hr_decides_and_only_owners_cancel(pool: PgPool) {
    let hr = create_user(&pool, "people", "hr").await;
    let (user, _) = staff(&pool).await;
    let colleague = create_user(&pool, "colleague", "employee").await;
    create_employee(&pool, &colleague, "EMP-101").await;
    let monday = future_monday();

    let created = expect_json(
        request_leave(&pool, &user, "annual", monday, monday).await,
        StatusCode::CREATED,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/leave-requests/{id}/approve"), &user.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response =
        post_auth(app, &format!("/api/v1/leave-requests/{id}/cancel"), &colleague.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/leave-requests/{id}/cancel"), &user.token).await;
    let cancelled = expect_json(response, StatusCode::OK).await;
    assert_eq!(cancelled["data"]["status"], "cancelled");

    // Decisions are only legal on pending requests.
    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/leave-requests/{id}/reject"), &hr.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/leave-requests/mine", &user.token).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_without_an_employee_record_cannot_request_leave(pool: PgPool) {
    let user = create_user(&pool, "contractor", "editor").await;
    let monday = future_monday();
    let response = request_leave(&pool, &user, "annual", monday, monday).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_overlapping_requests_admit_one(pool: PgPool) {
    let (user, employee_id) = staff(&pool).await;
    let monday = future_monday();
    let end = monday + Duration::days(1);

    let (first, second) = tokio::join!(
        request_leave(&pool, &user, "sick", monday, end),
        request_leave(&pool, &user, "sick", monday, end),
    );
    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}
