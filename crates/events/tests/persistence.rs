use std::time::Duration;

use sqlx::PgPool;
use studio_db::repositories::EventRepo;
use studio_events::names;
use studio_events::{EventBus, EventPersistence, PlatformEvent};

#[sqlx::test(migrations = "../../db/migrations")]
async fn persists_published_events_until_bus_closes(pool: PgPool) {
    let bus = EventBus::default();
    let handle = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new(names::EPISODE_CREATED)
            .with_source(names::ENTITY_EPISODE, 5)
            .with_payload(serde_json::json!({"episode_number": 1})),
    );
    bus.publish(
        PlatformEvent::new(names::WORK_ACCEPTED)
            .with_source(names::ENTITY_EPISODE, 5)
            .with_payload(serde_json::json!({"department": "creative"})),
    );
    drop(bus);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("persistence should stop when the bus closes")
        .unwrap();

    let events = EventRepo::list_for_entity(&pool, names::ENTITY_EPISODE, 5, 10)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert!(types.contains(&"episode.created"));
    assert!(types.contains(&"work.accepted"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn persist_writes_actor_and_payload(pool: PgPool) {
    let event = PlatformEvent::new(names::LOAN_RETURNED)
        .with_source(names::ENTITY_EQUIPMENT_LOAN, 9)
        .with_payload(serde_json::json!({"quantity": 2}));
    let id = EventPersistence::persist(&pool, &event).await.unwrap();

    let stored = EventRepo::list_for_entity(&pool, names::ENTITY_EQUIPMENT_LOAN, 9, 1)
        .await
        .unwrap();
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].payload["quantity"], 2);
    assert!(stored[0].actor_user_id.is_none());
}
