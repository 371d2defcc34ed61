use sqlx::PgConnection;
use studio_core::notification::NotificationContent;
use studio_core::types::DbId;
use studio_db::models::notification::NewNotification;
use studio_db::repositories::NotificationRepo;

/// Borrow `content` as a row linked to `entity_type`/`entity_id`.
pub fn linked<'a>(
    content: &'a NotificationContent,
    entity_type: &'a str,
    entity_id: DbId,
) -> NewNotification<'a> {
    NewNotification {
        kind: content.kind,
        title: &content.title,
        message: &content.message,
        entity_type: Some(entity_type),
        entity_id: Some(entity_id),
    }
}

/// Notify a single user, skipping the actor themself.
pub async fn notify_user(
    conn: &mut PgConnection,
    user_id: Option<DbId>,
    actor_id: DbId,
    notification: &NewNotification<'_>,
) -> Result<(), sqlx::Error> {
    match user_id {
        Some(user_id) if user_id != actor_id => {
            NotificationRepo::create(conn, user_id, notification).await?;
        }
        _ => {}
    }
    Ok(())
}
