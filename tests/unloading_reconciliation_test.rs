use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use depot_api::{
    db::{create_db_pool, run_migrations},
    entities::{
        daily_sales::{self, Entity as DailySales},
        daily_sales_detail::{self, Entity as DailySalesDetail},
        loading_transaction::{Entity as LoadingTransaction, LoadingStatus},
        lorry,
        product,
        stock_ledger,
        unloading_transaction::UnloadingStatus,
    },
    errors::ServiceError,
    events::EventSender,
    services::{
        loading::{LoadingLine, NewLoading},
        unloading::{NewUnloading, UnloadingLine},
        LoadingService, StockLedgerService, UnloadingService,
    },
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::{env, sync::Arc};
use tokio::sync::mpsc;

fn dec(value: i64) -> Decimal {
    Decimal::new(value * 10_000, 4)
}

fn sales_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 9).expect("valid date")
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
        size: Set(None),
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
        driver_name: Set(None),
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

async fn daily_sales_for(
    db: &depot_api::db::DbPool,
    lorry_id: i64,
    date: NaiveDate,
) -> daily_sales::Model {
    DailySales::find()
        .filter(daily_sales::Column::LorryId.eq(lorry_id))
        .filter(daily_sales::Column::SalesDate.eq(date))
        .one(db)
        .await
        .expect("Daily sales query failed")
        .expect("Daily sales row missing")
}

#[tokio::test]
async fn unloading_reconciles_daily_sales() {
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
    let unloading_service = UnloadingService::new(db_pool.clone(), event_sender.clone());

    // 12-pack costing 2 per bottle, selling at 3.
    let soda = create_test_product(db, "Soda 330ml", 12, dec(2), dec(3)).await;
    let lorry = create_test_lorry(db, "LRY-RECON").await;

    stock_service
        .receive_stock(soda.id, 10, 0, None)
        .await
        .expect("Receipt failed");

    // Morning: load 5 cases (60 bottles).
    let loading = loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: Some(sales_date()),
            loading_time: None,
            loaded_by: None,
            details: vec![LoadingLine {
                product_id: soda.id,
                cases_loaded: 5,
                bottles_loaded: 0,
            }],
        })
        .await
        .expect("Loading failed");

    // Evening: 1 case + 3 bottles come back; 45 bottles sold.
    let unloading = unloading_service
        .create(NewUnloading {
            lorry_id: lorry.id,
            unloading_date: Some(sales_date()),
            unloading_time: None,
            unloaded_by: None,
            details: vec![UnloadingLine {
                product_id: soda.id,
                cases_returned: 1,
                bottles_returned: 3,
            }],
        })
        .await
        .expect("Unloading failed");
    assert_eq!(
        unloading.header.status(),
        Some(UnloadingStatus::Completed)
    );

    // The pending loading was closed out by the unloading.
    let loading_after = LoadingTransaction::find_by_id(loading.header.id)
        .one(db)
        .await
        .expect("Loading query failed")
        .expect("Loading row missing");
    assert_eq!(loading_after.status(), Some(LoadingStatus::Unloaded));

    // Ledger: 120 - 60 + 15 = 75 bottles = 6 cases + 3 bottles.
    let ledger = ledger_for(db, soda.id).await;
    assert_eq!(ledger.total_bottles, 75);
    assert_eq!(ledger.cases_qty, 6);
    assert_eq!(ledger.bottles_qty, 3);

    // Daily sales: 45 sold, income 45 * 3, profit 45 * (3 - 2).
    let sales = daily_sales_for(db, lorry.id, sales_date()).await;
    assert_eq!(sales.units_sold, 45);
    assert_eq!(sales.sales_income, dec(45 * 3));
    assert_eq!(sales.gross_profit, dec(45));

    let details = DailySalesDetail::find()
        .filter(daily_sales_detail::Column::SalesId.eq(sales.id))
        .all(db)
        .await
        .expect("Detail query failed");
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].product_id, soda.id);
    assert_eq!(details[0].units_sold, 45);

    // A second unloading the same day (nothing more returned) upserts the
    // same record instead of duplicating it.
    unloading_service
        .create(NewUnloading {
            lorry_id: lorry.id,
            unloading_date: Some(sales_date()),
            unloading_time: None,
            unloaded_by: None,
            details: vec![],
        })
        .await
        .expect("Empty unloading failed");

    let headers = DailySales::find()
        .filter(daily_sales::Column::LorryId.eq(lorry.id))
        .filter(daily_sales::Column::SalesDate.eq(sales_date()))
        .all(db)
        .await
        .expect("Daily sales query failed");
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].units_sold, 45);
    assert_eq!(headers[0].sales_income, dec(45 * 3));

    // Cancelling the unloading pulls the returned stock back out and the
    // day's sales now count the full load as sold.
    let cancelled = unloading_service
        .cancel(unloading.header.id)
        .await
        .expect("Cancel failed");
    assert_eq!(cancelled.status(), Some(UnloadingStatus::Cancelled));

    let ledger = ledger_for(db, soda.id).await;
    assert_eq!(ledger.total_bottles, 60);
    assert_eq!(ledger.cases_qty, 5);
    assert_eq!(ledger.bottles_qty, 0);

    let sales = daily_sales_for(db, lorry.id, sales_date()).await;
    assert_eq!(sales.units_sold, 60);
    assert_eq!(sales.sales_income, dec(60 * 3));
    assert_eq!(sales.gross_profit, dec(60));

    // Cancelling twice is rejected.
    let err = unloading_service
        .cancel(unloading.header.id)
        .await
        .expect_err("Double cancel should fail");
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn fully_returned_load_leaves_no_sales_detail() {
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
    let unloading_service = UnloadingService::new(db_pool.clone(), event_sender.clone());

    let tonic = create_test_product(db, "Tonic 200ml", 24, dec(1), dec(2)).await;
    let lorry = create_test_lorry(db, "LRY-NOSALE").await;

    stock_service
        .receive_stock(tonic.id, 4, 0, None)
        .await
        .expect("Receipt failed");

    loading_service
        .create(NewLoading {
            lorry_id: lorry.id,
            loading_date: Some(sales_date()),
            loading_time: None,
            loaded_by: None,
            details: vec![LoadingLine {
                product_id: tonic.id,
                cases_loaded: 2,
                bottles_loaded: 0,
            }],
        })
        .await
        .expect("Loading failed");

    // Everything loaded comes straight back.
    unloading_service
        .create(NewUnloading {
            lorry_id: lorry.id,
            unloading_date: Some(sales_date()),
            unloading_time: None,
            unloaded_by: None,
            details: vec![UnloadingLine {
                product_id: tonic.id,
                cases_returned: 2,
                bottles_returned: 0,
            }],
        })
        .await
        .expect("Unloading failed");

    // Conservation: the ledger is back where it started.
    let ledger = ledger_for(db, tonic.id).await;
    assert_eq!(ledger.total_bottles, 96);
    assert_eq!(ledger.cases_qty, 4);
    assert_eq!(ledger.bottles_qty, 0);

    // The header exists with zero totals and no detail row for the product.
    let sales = daily_sales_for(db, lorry.id, sales_date()).await;
    assert_eq!(sales.units_sold, 0);
    assert_eq!(sales.sales_income, dec(0));
    assert_eq!(sales.gross_profit, dec(0));

    let details = DailySalesDetail::find()
        .filter(daily_sales_detail::Column::SalesId.eq(sales.id))
        .all(db)
        .await
        .expect("Detail query failed");
    assert!(details.is_empty());
}
