use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineError, MovementNew, MovementPatch, MovementStatus, Period, TransactionNew,
};
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

fn movement(wallet_id: Uuid, amount: f64, day: u32) -> MovementNew {
    MovementNew {
        description: format!("movement {amount}"),
        amount,
        date: date(2024, 3, day),
        wallet_id,
        type_payment_id: None,
        category_id: None,
        sub_category_id: None,
        status: MovementStatus::Paid,
        transaction_id: None,
    }
}

#[tokio::test]
async fn add_consistent_groups_realized_under_estimate() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    let view = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, -500.0, 1),
                realized: vec![movement(wallet.id, -120.0, 3), movement(wallet.id, -80.0, 9)],
            },
            "alice",
        )
        .await
        .unwrap();

    let estimate = view.estimate.clone().unwrap();
    assert_eq!(estimate.status, MovementStatus::Planned);
    assert_eq!(estimate.transaction_id, Some(estimate.id));
    assert!(view
        .movements
        .iter()
        .all(|m| m.transaction_id == Some(estimate.id) && m.status == MovementStatus::Paid));
    assert_eq!(view.consolidation.estimated, -500.0);
    assert_eq!(view.consolidation.realized, -200.0);
    assert_eq!(view.consolidation.remaining, -300.0);

    // Only the paid movements touch the wallet.
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, -200.0);

    let found = engine.transaction(estimate.id, "alice").await.unwrap();
    assert_eq!(found.estimate.map(|m| m.id), Some(estimate.id));
    let ids = |movements: &[engine::Movement]| movements.iter().map(|m| m.id).collect::<Vec<_>>();
    assert_eq!(ids(&found.movements), ids(&view.movements));
    assert_eq!(found.consolidation, view.consolidation);
}

#[tokio::test]
async fn add_consistent_rolls_back_on_bad_realized() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    let err = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, -500.0, 1),
                realized: vec![
                    movement(wallet.id, -120.0, 3),
                    movement(Uuid::new_v4(), -80.0, 9),
                ],
            },
            "alice",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.movements("alice").await.unwrap().is_empty());
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 0.0);
}

#[tokio::test]
async fn consolidation_by_id_sums_children_added_later() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    let mut estimate = movement(wallet.id, 1000.0, 1);
    estimate.status = MovementStatus::Planned;
    let estimate = engine.add_movement(estimate, "alice").await.unwrap();

    for amount in [300.0, 450.0] {
        let mut realized = movement(wallet.id, amount, 10);
        realized.transaction_id = Some(estimate.id);
        engine.add_movement(realized, "alice").await.unwrap();
    }
    // A planned child is not realized yet.
    let mut pending = movement(wallet.id, 999.0, 11);
    pending.status = MovementStatus::Planned;
    pending.transaction_id = Some(estimate.id);
    engine.add_movement(pending, "alice").await.unwrap();

    let view = engine.transaction(estimate.id, "alice").await.unwrap();
    assert_eq!(view.movements.len(), 2);
    assert_eq!(view.consolidation.estimated, 1000.0);
    assert_eq!(view.consolidation.realized, 750.0);
    assert_eq!(view.consolidation.remaining, 250.0);
}

#[tokio::test]
async fn paid_movement_is_not_a_transaction() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let paid = engine
        .add_movement(movement(wallet.id, 10.0, 1), "alice")
        .await
        .unwrap();

    let err = engine.transaction(paid.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.transaction(Uuid::new_v4(), "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn movements_group_only_under_a_planned_estimate() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let paid = engine
        .add_movement(movement(wallet.id, 10.0, 1), "alice")
        .await
        .unwrap();

    let mut under_paid = movement(wallet.id, 30.0, 2);
    under_paid.transaction_id = Some(paid.id);
    let err = engine.add_movement(under_paid, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let view = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, 100.0, 1),
                realized: vec![movement(wallet.id, 40.0, 3)],
            },
            "alice",
        )
        .await
        .unwrap();
    let child = view.movements[0].id;

    // A realized movement is not an estimate either.
    let mut under_child = movement(wallet.id, 5.0, 4);
    under_child.transaction_id = Some(child);
    let err = engine.add_movement(under_child, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_movement(
            paid.id,
            MovementPatch {
                transaction_id: Some(child),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 50.0);
    assert_eq!(engine.movements("alice").await.unwrap().len(), 3);
}

#[tokio::test]
async fn estimate_with_realized_movements_stays_a_planned_root() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();
    let view = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, 100.0, 1),
                realized: vec![movement(wallet.id, 40.0, 3)],
            },
            "alice",
        )
        .await
        .unwrap();
    let estimate = view.estimate.as_ref().map(|m| m.id).unwrap();
    let other = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, 70.0, 2),
                realized: vec![],
            },
            "alice",
        )
        .await
        .unwrap();
    let other = other.estimate.as_ref().map(|m| m.id).unwrap();

    let err = engine
        .update_movement(
            estimate,
            MovementPatch {
                status: Some(MovementStatus::Paid),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_movement(
            estimate,
            MovementPatch {
                transaction_id: Some(other),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing moved: the group is still whole and the wallet untouched.
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 40.0);
    let period = Period::new(None, None).unwrap();
    let views = engine.transactions_in_period(&period, "alice").await.unwrap();
    let shown: usize = views.iter().map(|v| v.movements.len()).sum();
    assert_eq!(shown, 1);

    // A plain description change on the estimate is still allowed.
    let renamed = engine
        .update_movement(
            estimate,
            MovementPatch {
                description: Some("rent".to_string()),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(renamed.description, "rent");

    // Once its realized movement is gone the estimate can be paid.
    engine.delete_movement(view.movements[0].id, "alice").await.unwrap();
    let paid = engine
        .update_movement(
            estimate,
            MovementPatch {
                status: Some(MovementStatus::Paid),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(paid.status, MovementStatus::Paid);
    assert_eq!(engine.wallet(wallet.id, "alice").await.unwrap().balance, 100.0);
}

#[tokio::test]
async fn transactions_in_period_lists_groups_then_ungrouped() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine.add_wallet("Nubank", 0.0, "alice").await.unwrap();

    let view = engine
        .add_consistent(
            TransactionNew {
                estimate: movement(wallet.id, -300.0, 5),
                // Realized after the period still belongs to its estimate.
                realized: vec![movement(wallet.id, -100.0, 28)],
            },
            "alice",
        )
        .await
        .unwrap();
    let loose = engine
        .add_movement(movement(wallet.id, 42.0, 7), "alice")
        .await
        .unwrap();

    let period = Period::parse(Some("2024-03-01"), Some("2024-03-10")).unwrap();
    let views = engine.transactions_in_period(&period, "alice").await.unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(
        views[0].estimate.as_ref().map(|m| m.id),
        view.estimate.as_ref().map(|m| m.id)
    );
    assert_eq!(views[0].consolidation.realized, -100.0);
    assert!(views[1].estimate.is_none());
    assert_eq!(views[1].movements.len(), 1);
    assert_eq!(views[1].movements[0].id, loose.id);
    assert_eq!(views[1].consolidation.realized, 42.0);
}

#[tokio::test]
async fn empty_period_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let period = Period::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();
    let err = engine
        .transactions_in_period(&period, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
