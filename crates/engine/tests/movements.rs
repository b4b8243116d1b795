use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, MovementNew, MovementPatch, MovementStatus, Period};
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

fn movement(wallet_id: Uuid, amount: f64, status: MovementStatus) -> MovementNew {
    MovementNew {
        description: "salary".to_string(),
        amount,
        date: date(2024, 1, 15),
        wallet_id,
        type_payment_id: None,
        category_id: None,
        sub_category_id: None,
        status,
        transaction_id: None,
    }
}

#[tokio::test]
async fn paid_movement_credits_wallet() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    assert_eq!(wallet.balance, 0.0);

    let added = engine
        .add_movement(movement(wallet.id, 1000.0, MovementStatus::Paid), "alice")
        .await
        .unwrap();

    assert_eq!(added.transaction_id, Some(added.id));
    let wallet = engine.wallet(wallet.id, "alice").await.unwrap();
    assert_eq!(wallet.balance, 1000.0);

    let balance = engine
        .balance(
            &Period::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).unwrap(),
            None,
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(balance.income, 1000.0);
    assert_eq!(balance.expense, 0.0);
}

#[tokio::test]
async fn planned_movement_leaves_wallet_untouched() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Itaú", 250.0, "alice").await.unwrap();

    engine
        .add_movement(movement(wallet.id, -80.0, MovementStatus::Planned), "alice")
        .await
        .unwrap();

    let wallet = engine.wallet(wallet.id, "alice").await.unwrap();
    assert_eq!(wallet.balance, 250.0);
}

#[tokio::test]
async fn unknown_wallet_writes_nothing() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_movement(
            movement(Uuid::new_v4(), 10.0, MovementStatus::Paid),
            "alice",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.movements("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn other_users_wallet_is_not_visible() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "bob").await.unwrap();

    let err = engine.wallet(wallet.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .add_movement(movement(wallet.id, 10.0, MovementStatus::Paid), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn update_moves_the_paid_amount() {
    let (engine, _db) = engine_with_db().await;
    let first = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let second = engine.add_wallet("Itaú", 0.0, "alice").await.unwrap();

    let added = engine
        .add_movement(movement(first.id, 100.0, MovementStatus::Paid), "alice")
        .await
        .unwrap();

    engine
        .update_movement(
            added.id,
            MovementPatch {
                amount: Some(40.0),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(engine.wallet(first.id, "alice").await.unwrap().balance, 40.0);

    engine
        .update_movement(
            added.id,
            MovementPatch {
                wallet_id: Some(second.id),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(engine.wallet(first.id, "alice").await.unwrap().balance, 0.0);
    assert_eq!(engine.wallet(second.id, "alice").await.unwrap().balance, 40.0);

    let updated = engine
        .update_movement(
            added.id,
            MovementPatch {
                status: Some(MovementStatus::Planned),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.status, MovementStatus::Planned);
    assert_eq!(updated.amount, 40.0);
    assert_eq!(engine.wallet(second.id, "alice").await.unwrap().balance, 0.0);
}

#[tokio::test]
async fn zero_amount_update_is_applied() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let added = engine
        .add_movement(movement(wallet.id, 30.0, MovementStatus::Paid), "alice")
        .await
        .unwrap();

    let updated = engine
        .update_movement(
            added.id,
            MovementPatch {
                amount: Some(0.0),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, 0.0);
    assert_eq!(updated.description, "salary");
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 0.0);
}

#[tokio::test]
async fn delete_reverts_wallet_and_reroots_children() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let root = engine
        .add_movement(movement(wallet.id, 500.0, MovementStatus::Planned), "alice")
        .await
        .unwrap();
    let mut child = movement(wallet.id, 20.0, MovementStatus::Paid);
    child.transaction_id = Some(root.id);
    let child = engine.add_movement(child, "alice").await.unwrap();
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 20.0);

    engine.delete_movement(root.id, "alice").await.unwrap();

    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 20.0);
    let child = engine.movement(child.id, "alice").await.unwrap();
    assert_eq!(child.transaction_id, Some(child.id));

    engine.delete_movement(child.id, "alice").await.unwrap();
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 0.0);
}

#[tokio::test]
async fn delete_unknown_movement_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .delete_movement(Uuid::new_v4(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn movements_in_period_are_filtered_and_ordered() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    for (day, amount) in [(20, 3.0), (5, 1.0), (31, 4.0), (10, 2.0)] {
        let mut new = movement(wallet.id, amount, MovementStatus::Planned);
        new.date = date(2024, 1, day);
        engine.add_movement(new, "alice").await.unwrap();
    }
    let mut outside = movement(wallet.id, 99.0, MovementStatus::Planned);
    outside.date = date(2024, 2, 1);
    engine.add_movement(outside, "alice").await.unwrap();

    let period = Period::parse(Some("2024-01-05"), Some("2024-01-31")).unwrap();
    let amounts: Vec<f64> = engine
        .movements_in_period(&period, "alice")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.amount)
        .collect();
    assert_eq!(amounts, vec![1.0, 2.0, 3.0, 4.0]);

    let open = Period::parse(Some("2024-01-21"), None).unwrap();
    assert_eq!(engine.movements_in_period(&open, "alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn balance_keeps_income_and_expense_apart() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    for (amount, status) in [
        (1000.0, MovementStatus::Paid),
        (-300.0, MovementStatus::Paid),
        (-50.0, MovementStatus::Planned),
        (0.0, MovementStatus::Paid),
    ] {
        engine
            .add_movement(movement(wallet.id, amount, status), "alice")
            .await
            .unwrap();
    }

    let period = Period::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).unwrap();
    let all = engine.balance(&period, None, "alice").await.unwrap();
    assert_eq!(all.income, 1000.0);
    assert_eq!(all.expense, -350.0);

    let paid = engine
        .balance(&period, Some(MovementStatus::Paid), "alice")
        .await
        .unwrap();
    assert_eq!(paid.expense, -300.0);

    let other = engine.balance(&period, None, "bob").await.unwrap();
    assert_eq!(other.income, 0.0);
    assert_eq!(other.expense, 0.0);
}

#[tokio::test]
async fn wallet_with_movements_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let added = engine
        .add_movement(movement(wallet.id, 1.0, MovementStatus::Planned), "alice")
        .await
        .unwrap();

    let err = engine.delete_wallet(wallet.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.delete_movement(added.id, "alice").await.unwrap();
    engine.delete_wallet(wallet.id, "alice").await.unwrap();
    assert!(engine.wallets("alice").await.unwrap().is_empty());
}
