use assert_matches::assert_matches;
use chrono::Utc;
use depot_api::{
    db::{create_db_pool, run_migrations},
    entities::{
        inventory_transaction::{self, Entity as InventoryTransaction},
        loading_detail::Entity as LoadingDetail,
        loading_transaction::{Entity as LoadingTransaction, LoadingStatus},
        lorry,
        product,
        stock_ledger,
    },
    errors::ServiceError,
    events::EventSender,
    services::{
        loading::{LoadingLine, NewLoading},
        stock_ledger::{apply_plan, plan_increment},
        LoadingService, StockLedgerService,
    },
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::{env, sync::Arc};
use tokio::sync::mpsc;

fn dec(value: i64) -> Decimal {
    Decimal::new(value * 10_000, 4)
}

async fn create_test_product(
    db: &depot_api::db::DbPool,
    name: &str,
    bottles_per_case: i32,
    unit_price: Decimal,
    selling_price: Decimal,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_string()),
        size: Set(Some("500ml".to_string())),
        bottles_per_case: Set(bottles_per_case),
        unit_price: Set(unit_price),
        selling_price: Set(selling_price),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create product")
}

async fn create_test_lorry(db: &depot_api::db::DbPool, number: &str) -> lorry::Model {
    lorry::ActiveModel {
        lorry_number: Set(number.to_string()),
        driver_name: Set(Some("Test Driver".to_string())),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create lorry")
}

async fn ledger_for(db: &depot_api::db::DbPool, product_id: i64) -> stock_ledger::Model {
    stock_ledger::Entity::find()
        .filter(stock_ledger::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .expect("Ledger query failed")
        .expect("Ledger row missing")
}

#[tokio::test]
async fn stock_receipt_loading_and_case_breaking() {
    env::set_var("APP__DATABASE_URL", "sqlite::memory:?cache=shared");

    let db_pool = Arc::new(create_db_pool().await.expect("Failed to create DB pool"));
    run_migrations(db_pool.as_ref())
        .await
        .expect("Failed to run migrations");
    let db = db_pool.as_ref();

    let (tx, _rx) = mpsc::channel(100);
    let event_sender = Arc::new(EventSender::new(tx));

    let stock_service = StockLedgerService::new(db_pool.clone(), event_sender.clone());
    let loading_service = LoadingService::new(db_pool.clone(), event_sender.clone());

    let cola = create_test_product(db, "Cola 500ml", 24, dec(3), dec(5)).await;
    let lorry = create_test_lorry(db, "LRY-001").await;

    // Receipt creates the ledger row with normalized quantities.
    let ledger = stock_service
        .receive_stock(cola.id, 2, 10, Some("Opening stock".into()))
        .await
        .expect("Receipt failed");
    assert_eq!(ledger.cases_qty, 2);
    assert_eq!(ledger.bottles_qty, 10);
    assert_eq!(ledger.total_bottles, 58);
    assert_eq!(ledger.total_value, dec(58 * 3));

    // Loading 1 case + 20 bottles forces a case break: 2 cases + 10 bottles
    // on hand becomes 0 cases + 14 bottles.
    let created = loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: None,
            loading_time: None,
            loaded_by: Some("tester".into()),
            details: vec![LoadingLine {
                product_id: cola.id,
                cases_loaded: 1,
                bottles_loaded: 20,
            }],
        })
        .await
        .expect("Loading failed");

    assert_eq!(created.header.status(), Some(LoadingStatus::Pending));
    assert_eq!(created.details.len(), 1);
    assert_eq!(created.details[0].total_bottles_loaded, 44);
    assert_eq!(created.details[0].value, dec(44 * 3));

    let ledger = ledger_for(db, cola.id).await;
    assert_eq!(ledger.cases_qty, 0);
    assert_eq!(ledger.bottles_qty, 14);
    assert_eq!(ledger.total_bottles, 14);
    assert_eq!(ledger.total_value, dec(14 * 3));

    // The audit trail carries the originally requested quantities.
    let removals = InventoryTransaction::find()
        .filter(inventory_transaction::Column::ProductId.eq(cola.id))
        .filter(inventory_transaction::Column::TransactionType.eq("REMOVE"))
        .all(db)
        .await
        .expect("Audit query failed");
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].cases_qty, 1);
    assert_eq!(removals[0].bottles_qty, 20);
    assert_eq!(removals[0].total_bottles, 44);

    // Asking for more than is on hand fails with InsufficientStock and
    // changes nothing.
    let err = loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: None,
            loading_time: None,
            loaded_by: None,
            details: vec![LoadingLine {
                product_id: cola.id,
                cases_loaded: 0,
                bottles_loaded: 15,
            }],
        })
        .await
        .expect_err("Overdraw should fail");
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let ledger = ledger_for(db, cola.id).await;
    assert_eq!(ledger.total_bottles, 14);

    // Cancelling the loading returns the stock, re-normalized.
    let cancelled = loading_service
        .update_status(created.header.id, LoadingStatus::Cancelled)
        .await
        .expect("Cancel failed");
    assert_eq!(cancelled.status(), Some(LoadingStatus::Cancelled));

    let ledger = ledger_for(db, cola.id).await;
    assert_eq!(ledger.total_bottles, 58);
    assert_eq!(ledger.cases_qty, 2);
    assert_eq!(ledger.bottles_qty, 10);

    // A cancelled transaction cannot change status again.
    let err = loading_service
        .update_status(created.header.id, LoadingStatus::Unloaded)
        .await
        .expect_err("Transition from Cancelled should fail");
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn multi_line_loading_is_atomic() {
    env::set_var("APP__DATABASE_URL", "sqlite::memory:?cache=shared");

    let db_pool = Arc::new(create_db_pool().await.expect("Failed to create DB pool"));
    run_migrations(db_pool.as_ref())
        .await
        .expect("Failed to run migrations");
    let db = db_pool.as_ref();

    let (tx, _rx) = mpsc::channel(100);
    let event_sender = Arc::new(EventSender::new(tx));

    let stock_service = StockLedgerService::new(db_pool.clone(), event_sender.clone());
    let loading_service = LoadingService::new(db_pool.clone(), event_sender.clone());

    let water = create_test_product(db, "Water 1L", 12, dec(1), dec(2)).await;
    let juice = create_test_product(db, "Juice 330ml", 24, dec(2), dec(4)).await;
    let lorry = create_test_lorry(db, "LRY-ATOMIC").await;

    stock_service
        .receive_stock(water.id, 10, 0, None)
        .await
        .expect("Receipt failed");
    stock_service
        .receive_stock(juice.id, 1, 0, None)
        .await
        .expect("Receipt failed");

    // First line is satisfiable, second overdraws; the whole creation must
    // roll back.
    let err = loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: None,
            loading_time: None,
            loaded_by: None,
            details: vec![
                LoadingLine {
                    product_id: water.id,
                    cases_loaded: 5,
                    bottles_loaded: 0,
                },
                LoadingLine {
                    product_id: juice.id,
                    cases_loaded: 3,
                    bottles_loaded: 0,
                },
            ],
        })
        .await
        .expect_err("Second line overdraws");
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // No header or detail row survived the rollback.
    let headers = LoadingTransaction::find()
        .filter(depot_api::entities::loading_transaction::Column::LorryId.eq(lorry.id))
        .all(db)
        .await
        .expect("Header query failed");
    assert!(headers.is_empty());

    let details = LoadingDetail::find()
        .all(db)
        .await
        .expect("Detail query failed");
    assert!(details
        .iter()
        .all(|d| d.product_id != water.id && d.product_id != juice.id));

    // The first line's ledger decrement was rolled back too, and no REMOVE
    // audit row leaked out.
    let water_ledger = ledger_for(db, water.id).await;
    assert_eq!(water_ledger.cases_qty, 10);
    assert_eq!(water_ledger.total_bottles, 120);

    let removals = InventoryTransaction::find()
        .filter(inventory_transaction::Column::ProductId.eq(water.id))
        .filter(inventory_transaction::Column::TransactionType.eq("REMOVE"))
        .all(db)
        .await
        .expect("Audit query failed");
    assert!(removals.is_empty());
}

#[tokio::test]
async fn invalid_quantities_are_rejected() {
    env::set_var("APP__DATABASE_URL", "sqlite::memory:?cache=shared");

    let db_pool = Arc::new(create_db_pool().await.expect("Failed to create DB pool"));
    run_migrations(db_pool.as_ref())
        .await
        .expect("Failed to run migrations");
    let db = db_pool.as_ref();

    let (tx, _rx) = mpsc::channel(100);
    let event_sender = Arc::new(EventSender::new(tx));

    let stock_service = StockLedgerService::new(db_pool.clone(), event_sender.clone());
    let loading_service = LoadingService::new(db_pool.clone(), event_sender.clone());

    let fizz = create_test_product(db, "Fizz 250ml", 24, dec(2), dec(4)).await;
    let lorry = create_test_lorry(db, "LRY-INVALID").await;

    // A receipt whose flattened total cannot fit the ledger columns is
    // rejected before anything is written.
    let err = stock_service
        .receive_stock(fizz.id, 100_000_000, 0, None)
        .await
        .expect_err("Oversized receipt should fail");
    assert_matches!(err, ServiceError::ValidationError(_));

    let ledger = stock_ledger::Entity::find()
        .filter(stock_ledger::Column::ProductId.eq(fizz.id))
        .one(db)
        .await
        .expect("Ledger query failed");
    assert!(ledger.is_none());

    // Negative loading lines never reach the ledger either.
    stock_service
        .receive_stock(fizz.id, 2, 0, None)
        .await
        .expect("Receipt failed");

    let err = loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: None,
            loading_time: None,
            loaded_by: None,
            details: vec![LoadingLine {
                product_id: fizz.id,
                cases_loaded: -1,
                bottles_loaded: 0,
            }],
        })
        .await
        .expect_err("Negative line should fail");
    assert_matches!(err, ServiceError::ValidationError(_));

    let ledger = ledger_for(db, fizz.id).await;
    assert_eq!(ledger.total_bottles, 48);
}

#[tokio::test]
async fn stale_ledger_version_is_a_conflict() {
    env::set_var("APP__DATABASE_URL", "sqlite::memory:?cache=shared");

    let db_pool = Arc::new(create_db_pool().await.expect("Failed to create DB pool"));
    run_migrations(db_pool.as_ref())
        .await
        .expect("Failed to run migrations");
    let db = db_pool.as_ref();

    let (tx, _rx) = mpsc::channel(100);
    let event_sender = Arc::new(EventSender::new(tx));

    let stock_service = StockLedgerService::new(db_pool.clone(), event_sender.clone());

    let pop = create_test_product(db, "Pop 1L", 12, dec(2), dec(3)).await;
    stock_service
        .receive_stock(pop.id, 2, 0, None)
        .await
        .expect("Receipt failed");

    // Two writers plan from the same snapshot; the version guard lets only
    // the first one through.
    let stale = ledger_for(db, pop.id).await;
    let plan = plan_increment(stale.total_bottles, 1, 0, 12).expect("Plan failed");

    apply_plan(db, &stale, &plan, pop.unit_price)
        .await
        .expect("First writer should win");
    let err = apply_plan(db, &stale, &plan, pop.unit_price)
        .await
        .expect_err("Second writer should lose");
    assert_matches!(err, ServiceError::Conflict(_));

    let ledger = ledger_for(db, pop.id).await;
    assert_eq!(ledger.version, stale.version + 1);
    assert_eq!(ledger.total_bottles, 36);
    assert_eq!(ledger.total_value, dec(36 * 2));
}
