use chrono::{Duration, Utc};
use sqlx::PgPool;
use studio_db::models::user::{CreateUser, UserFilter};
use studio_db::repositories::{RoleRepo, UserRepo};

async fn user(pool: &PgPool, username: &str, role: &str) -> i64 {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@Studio.test"),
            full_name: format!("Staff {username}"),
            password_hash: "x".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_lookup_matches_username_or_email(pool: PgPool) {
    let id = user(&pool, "mixer", "sound_engineer").await;

    let found = UserRepo::find_for_login(&pool, "mixer").await.unwrap().unwrap();
    assert_eq!(found.user.id, id);
    assert_eq!(found.role, "sound_engineer");

    let found = UserRepo::find_for_login(&pool, "MIXER@studio.test").await.unwrap().unwrap();
    assert_eq!(found.user.id, id);

    assert!(UserRepo::find_for_login(&pool, "Mixer").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_logins_lock_at_the_threshold(pool: PgPool) {
    let id = user(&pool, "cutter", "editor").await;
    let until = Utc::now() + Duration::minutes(15);

    assert!(!UserRepo::record_failed_login(&pool, id, 3, until).await.unwrap());
    assert!(!UserRepo::record_failed_login(&pool, id, 3, until).await.unwrap());
    assert!(UserRepo::record_failed_login(&pool, id, 3, until).await.unwrap());

    let row = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.failed_login_count, 3);
    assert!(row.locked_until.is_some());

    UserRepo::record_successful_login(&pool, id).await.unwrap();
    let row = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.failed_login_count, 0);
    assert!(row.locked_until.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_role_and_activity(pool: PgPool) {
    let editor = user(&pool, "cutter", "editor").await;
    user(&pool, "grader", "editor").await;
    user(&pool, "people", "hr").await;
    UserRepo::deactivate(&pool, editor).await.unwrap();

    let editors = UserRepo::list(
        &pool,
        &UserFilter {
            role: Some("editor".to_string()),
            is_active: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(editors.len(), 1);
    assert_eq!(editors[0].username, "grader");

    let everyone = UserRepo::list(&pool, &UserFilter::default()).await.unwrap();
    assert_eq!(everyone.len(), 3);
}
