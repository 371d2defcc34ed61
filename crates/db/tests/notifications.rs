use chrono::{Duration, Utc};
use sqlx::PgPool;
use studio_db::models::notification::NewNotification;
use studio_db::models::user::CreateUser;
use studio_db::repositories::{NotificationRepo, RoleRepo, UserRepo};

async fn user(pool: &PgPool, username: &str, role: &str) -> i64 {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@studio.test"),
            full_name: username.to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn note() -> NewNotification<'static> {
    NewNotification {
        kind: "loan_requested",
        title: "Equipment loan request",
        message: "camera requested 1 x Tripod.",
        entity_type: Some("equipment_loan"),
        entity_id: Some(1),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn notify_roles_skips_excluded_and_inactive_users(pool: PgPool) {
    let first = user(&pool, "store1", "inventory").await;
    let second = user(&pool, "store2", "inventory").await;
    let inactive = user(&pool, "store3", "inventory").await;
    let outsider = user(&pool, "editor", "editor").await;
    UserRepo::deactivate(&pool, inactive).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let created = NotificationRepo::notify_roles(&mut conn, &["inventory"], Some(second), &note())
        .await
        .unwrap();
    assert_eq!(created, 1);

    assert_eq!(NotificationRepo::unread_count(&pool, first).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, second).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, outsider).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_read_is_scoped_to_owner(pool: PgPool) {
    let owner = user(&pool, "owner", "production").await;
    let other = user(&pool, "other", "production").await;
    let mut conn = pool.acquire().await.unwrap();
    let id = NotificationRepo::create(&mut conn, owner, &note()).await.unwrap();
    NotificationRepo::create(&mut conn, owner, &note()).await.unwrap();

    assert!(!NotificationRepo::mark_read(&pool, id, other).await.unwrap());
    assert!(NotificationRepo::mark_read(&pool, id, owner).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, id, owner).await.unwrap());

    let unread = NotificationRepo::list_for_user(&pool, owner, true, 50, 0).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(NotificationRepo::mark_all_read(&pool, owner).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cleanup_deletes_only_old_read_notifications(pool: PgPool) {
    let owner = user(&pool, "owner", "production").await;
    let mut conn = pool.acquire().await.unwrap();
    let read = NotificationRepo::create(&mut conn, owner, &note()).await.unwrap();
    NotificationRepo::create(&mut conn, owner, &note()).await.unwrap();
    NotificationRepo::mark_read(&pool, read, owner).await.unwrap();

    let deleted = NotificationRepo::delete_read_older_than(&pool, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(deleted, 0);

    let deleted = NotificationRepo::delete_read_older_than(&pool, Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    let remaining = NotificationRepo::list_for_user(&pool, owner, false, 50, 0).await.unwrap();
    assert_eq!(remaining.len(), 1);
}
