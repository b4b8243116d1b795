use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{DEFAULT_OWNER, Engine, EngineError, MovementNew, MovementPatch, MovementStatus};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn default_categories_are_listed_with_owned_ones() {
    let (engine, _db) = engine_with_db().await;

    let shared = engine.add_category("Moradia", DEFAULT_OWNER).await.unwrap();
    engine
        .add_sub_category("Aluguel", shared.id, DEFAULT_OWNER)
        .await
        .unwrap();

    let categories = engine.categories("alice").await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, shared.id);
    assert_eq!(categories[0].user_id, DEFAULT_OWNER);
    assert_eq!(categories[0].sub_categories.len(), 1);
    assert_eq!(categories[0].sub_categories[0].description, "Aluguel");

    engine.add_category("Lazer", "alice").await.unwrap();
    engine.add_category("Alimentação", "alice").await.unwrap();
    engine.add_category("Viagem", "bob").await.unwrap();

    let names: Vec<String> = engine
        .categories("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.description)
        .collect();
    assert_eq!(names, vec!["Alimentação", "Lazer", "Moradia"]);
}

#[tokio::test]
async fn category_round_trip_and_sub_category_scope() {
    let (engine, _db) = engine_with_db().await;

    let category = engine.add_category("  Casa ", "alice").await.unwrap();
    assert_eq!(category.description, "Casa");
    engine
        .add_sub_category("Luz", category.id, "alice")
        .await
        .unwrap();
    // Someone else's sub-category never shows up.
    engine
        .add_sub_category("Água", category.id, "bob")
        .await
        .unwrap_err();

    let found = engine.category(category.id, "alice").await.unwrap();
    assert_eq!(found.description, "Casa");
    assert_eq!(found.sub_categories.len(), 1);

    let only = engine
        .sub_categories(Some(category.id), "alice")
        .await
        .unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].description, "Luz");
}

#[tokio::test]
async fn default_category_is_read_only_for_users() {
    let (engine, _db) = engine_with_db().await;
    let shared = engine.add_category("Moradia", DEFAULT_OWNER).await.unwrap();

    let err = engine
        .update_category(shared.id, Some("Minha casa"), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.delete_category(shared.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn empty_description_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.add_wallet("   ", 0.0, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine.add_type_payment("", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn deleting_unknown_ids_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let id = Uuid::new_v4();

    assert!(matches!(
        engine.delete_wallet(id, "alice").await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.delete_category(id, "alice").await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.delete_sub_category(id, "alice").await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.delete_type_payment(id, "alice").await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn referenced_rows_are_in_use() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let category = engine.add_category("Casa", "alice").await.unwrap();
    let sub = engine
        .add_sub_category("Luz", category.id, "alice")
        .await
        .unwrap();
    let pix = engine.add_type_payment("Pix", "alice").await.unwrap();

    let movement = engine
        .add_movement(
            MovementNew {
                description: "conta de luz".to_string(),
                amount: -120.0,
                date: date(2024, 1, 10),
                wallet_id: wallet.id,
                type_payment_id: Some(pix.id),
                category_id: None,
                sub_category_id: Some(sub.id),
                status: MovementStatus::Paid,
                transaction_id: None,
            },
            "alice",
        )
        .await
        .unwrap();
    // The parent is filled in from the sub-category.
    assert_eq!(movement.category_id, Some(category.id));

    assert!(matches!(
        engine.delete_category(category.id, "alice").await,
        Err(EngineError::InUse(_))
    ));
    assert!(matches!(
        engine.delete_sub_category(sub.id, "alice").await,
        Err(EngineError::InUse(_))
    ));
    assert!(matches!(
        engine.delete_type_payment(pix.id, "alice").await,
        Err(EngineError::InUse(_))
    ));

    engine.delete_movement(movement.id, "alice").await.unwrap();
    engine.delete_sub_category(sub.id, "alice").await.unwrap();
    engine.delete_category(category.id, "alice").await.unwrap();
    engine.delete_type_payment(pix.id, "alice").await.unwrap();
}

#[tokio::test]
async fn sub_category_of_another_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let casa = engine.add_category("Casa", "alice").await.unwrap();
    let lazer = engine.add_category("Lazer", "alice").await.unwrap();
    let luz = engine.add_sub_category("Luz", casa.id, "alice").await.unwrap();

    let err = engine
        .add_movement(
            MovementNew {
                description: "cinema".to_string(),
                amount: -30.0,
                date: date(2024, 1, 10),
                wallet_id: wallet.id,
                type_payment_id: None,
                category_id: Some(lazer.id),
                sub_category_id: Some(luz.id),
                status: MovementStatus::Paid,
                transaction_id: None,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 0.0);
}

#[tokio::test]
async fn moving_a_sub_category_carries_its_movements() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let casa = engine.add_category("Casa", "alice").await.unwrap();
    let lazer = engine.add_category("Lazer", "alice").await.unwrap();
    let aluguel = engine
        .add_sub_category("Aluguel", casa.id, "alice")
        .await
        .unwrap();

    let movement = engine
        .add_movement(
            MovementNew {
                description: "aluguel".to_string(),
                amount: -900.0,
                date: date(2024, 1, 5),
                wallet_id: wallet.id,
                type_payment_id: None,
                category_id: Some(casa.id),
                sub_category_id: Some(aluguel.id),
                status: MovementStatus::Paid,
                transaction_id: None,
            },
            "alice",
        )
        .await
        .unwrap();

    let moved = engine
        .update_sub_category(aluguel.id, None, Some(lazer.id), "alice")
        .await
        .unwrap();
    assert_eq!(moved.category_id, lazer.id);

    let stored = engine.movement(movement.id, "alice").await.unwrap();
    assert_eq!(stored.category_id, Some(lazer.id));

    let renamed = engine
        .update_movement(
            movement.id,
            MovementPatch {
                description: Some("aluguel janeiro".to_string()),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(renamed.description, "aluguel janeiro");
    assert_eq!(renamed.category_id, Some(lazer.id));
    assert_eq!(renamed.sub_category_id, Some(aluguel.id));
}
