use chrono::NaiveDate;
use sqlx::PgPool;
use studio_db::models::equipment::{CreateEquipment, CreateEquipmentLoan, UpdateEquipment};
use studio_db::models::user::CreateUser;
use studio_db::repositories::{EquipmentLoanRepo, EquipmentRepo, RoleRepo, UserRepo};

async fn borrower(pool: &PgPool) -> i64 {
    let role = RoleRepo::find_by_name(pool, "production").await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: "camera".to_string(),
            email: "camera@studio.test".to_string(),
            full_name: "Camera Operator".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn tripods() -> CreateEquipment {
    CreateEquipment {
        code: "TRP-01".to_string(),
        name: "Tripod".to_string(),
        category: Some("camera support".to_string()),
        total_quantity: 4,
        location: None,
    }
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_equipment_is_fully_available(pool: PgPool) {
    let item = EquipmentRepo::create(&pool, &tripods()).await.unwrap();
    assert_eq!(item.total_quantity, 4);
    assert_eq!(item.available_quantity, 4);
    assert_eq!(item.condition, "good");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_code_violates_unique_constraint(pool: PgPool) {
    EquipmentRepo::create(&pool, &tripods()).await.unwrap();
    let err = EquipmentRepo::create(&pool, &tripods()).await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_equipment_code")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn available_quantity_cannot_exceed_total(pool: PgPool) {
    let item = EquipmentRepo::create(&pool, &tripods()).await.unwrap();
    let mut tx = pool.begin().await.unwrap();
    EquipmentRepo::lock(&mut tx, item.id).await.unwrap().unwrap();
    let result = EquipmentRepo::adjust_available(&mut tx, item.id, 5).await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn loan_lifecycle_updates_columns(pool: PgPool) {
    let user_id = borrower(&pool).await;
    let item = EquipmentRepo::create(&pool, &tripods()).await.unwrap();
    let loan = EquipmentLoanRepo::create(
        &mut *pool.acquire().await.unwrap(),
        user_id,
        &CreateEquipmentLoan {
            equipment_id: item.id,
            episode_id: None,
            quantity: 2,
            loan_date: d(16),
            due_date: d(18),
            purpose: Some("Outdoor shoot".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(loan.status, "pending");

    let mut tx = pool.begin().await.unwrap();
    let approved = EquipmentLoanRepo::record_decision(&mut tx, loan.id, "approved", user_id, None)
        .await
        .unwrap();
    assert!(approved.decided_at.is_some());
    let returned = EquipmentLoanRepo::mark_returned(&mut tx, loan.id, Some("needs_repair"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(returned.status, "returned");
    assert_eq!(returned.return_condition.as_deref(), Some("needs_repair"));

    let pending = EquipmentLoanRepo::list(&pool, Some("pending"), None).await.unwrap();
    assert!(pending.is_empty());
    let mine = EquipmentLoanRepo::list(&pool, None, Some(user_id)).await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stock_and_field_updates_share_a_transaction(pool: PgPool) {
    let item = EquipmentRepo::create(&pool, &tripods()).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    EquipmentRepo::lock(&mut tx, item.id).await.unwrap().unwrap();
    EquipmentRepo::set_stock(&mut tx, item.id, 6, 6).await.unwrap();
    let bad_condition = UpdateEquipment {
        condition: Some("lost".to_string()),
        ..Default::default()
    };
    assert!(EquipmentRepo::update(&mut tx, item.id, &bad_condition)
        .await
        .is_err());
    drop(tx);

    let unchanged = EquipmentRepo::find_by_id(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(unchanged.total_quantity, 4);
    assert_eq!(unchanged.available_quantity, 4);
    assert_eq!(unchanged.condition, "good");
}
