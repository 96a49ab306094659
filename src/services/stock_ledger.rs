use crate::{
    db::DbPool,
    entities::{
        inventory_transaction::{self, TransactionType},
        product,
        stock_ledger::{self, Entity as StockLedger},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Target ledger state computed by the pure planning functions below. Nothing
/// here touches the database; the service applies a plan transactionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPlan {
    pub cases_qty: i32,
    pub bottles_qty: i32,
    pub total_bottles: i32,
}

impl LedgerPlan {
    pub fn total_value(&self, unit_price: Decimal) -> Decimal {
        Decimal::from(self.total_bottles) * unit_price
    }
}

/// Why a decrement could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortage {
    pub available_cases: i32,
    pub available_bottles: i32,
    pub requested_cases: i32,
    pub requested_bottles: i32,
}

/// Returned when a movement would push the ledger past what its columns can
/// represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

/// Plans a stock decrement with case breaking.
///
/// Cases are broken one at a time while the loose bottles on hand cannot cover
/// the requested bottles and there are still cases to spare beyond the
/// requested case count. Breaking a case may drive the requested bottle count
/// negative; that credits the surplus back as loose bottles.
pub fn plan_decrement(
    on_hand_cases: i32,
    on_hand_bottles: i32,
    requested_cases: i32,
    requested_bottles: i32,
    bottles_per_case: i32,
) -> Result<LedgerPlan, Shortage> {
    let shortage = Shortage {
        available_cases: on_hand_cases,
        available_bottles: on_hand_bottles,
        requested_cases,
        requested_bottles,
    };

    let mut cases = requested_cases;
    let mut bottles = requested_bottles;

    while bottles > on_hand_bottles && on_hand_cases > cases {
        cases += 1;
        bottles -= bottles_per_case;
    }

    if bottles > on_hand_bottles {
        return Err(shortage);
    }

    let new_cases = on_hand_cases - cases;
    let new_bottles = on_hand_bottles - bottles;
    if new_cases < 0 || new_bottles < 0 {
        return Err(shortage);
    }

    Ok(LedgerPlan {
        cases_qty: new_cases,
        bottles_qty: new_bottles,
        total_bottles: new_cases * bottles_per_case + new_bottles,
    })
}

/// Plans a stock increment, re-normalizing so `bottles_qty` ends up strictly
/// below `bottles_per_case`. The sum is computed wide; a grand total past
/// `i32::MAX` is an [`Overflow`], not a wrapped ledger.
pub fn plan_increment(
    on_hand_total_bottles: i32,
    added_cases: i32,
    added_bottles: i32,
    bottles_per_case: i32,
) -> Result<LedgerPlan, Overflow> {
    let grand_total = i64::from(on_hand_total_bottles)
        + i64::from(added_cases) * i64::from(bottles_per_case)
        + i64::from(added_bottles);
    let grand_total = i32::try_from(grand_total).map_err(|_| Overflow)?;

    Ok(LedgerPlan {
        cases_qty: grand_total / bottles_per_case,
        bottles_qty: grand_total % bottles_per_case,
        total_bottles: grand_total,
    })
}

/// Flattened bottle count of a cases/bottles pair, computed wide so callers
/// can range-check before persisting.
pub fn total_bottles(cases: i32, bottles: i32, bottles_per_case: i32) -> i64 {
    i64::from(cases) * i64::from(bottles_per_case) + i64::from(bottles)
}

/// Writes a planned ledger state back, guarded by the row's version. Zero rows
/// affected means another writer got there first; the caller's transaction
/// must abort.
pub async fn apply_plan<C: ConnectionTrait>(
    conn: &C,
    ledger: &stock_ledger::Model,
    plan: &LedgerPlan,
    unit_price: Decimal,
) -> Result<stock_ledger::Model, ServiceError> {
    let result = StockLedger::update_many()
        .col_expr(stock_ledger::Column::CasesQty, Expr::value(plan.cases_qty))
        .col_expr(stock_ledger::Column::BottlesQty, Expr::value(plan.bottles_qty))
        .col_expr(
            stock_ledger::Column::TotalBottles,
            Expr::value(plan.total_bottles),
        )
        .col_expr(
            stock_ledger::Column::TotalValue,
            Expr::value(plan.total_value(unit_price)),
        )
        .col_expr(
            stock_ledger::Column::Version,
            Expr::col(stock_ledger::Column::Version).add(1),
        )
        .col_expr(stock_ledger::Column::LastUpdated, Expr::value(Utc::now()))
        .filter(stock_ledger::Column::Id.eq(ledger.id))
        .filter(stock_ledger::Column::Version.eq(ledger.version))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    if result.rows_affected == 0 {
        return Err(ServiceError::Conflict(format!(
            "Stock ledger row for product {} was modified concurrently",
            ledger.product_id
        )));
    }

    StockLedger::find_by_id(ledger.id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Stock ledger row {} vanished after update",
                ledger.id
            ))
        })
}

/// Appends an audit row carrying the originally requested quantities.
pub async fn record_movement<C: ConnectionTrait>(
    conn: &C,
    product: &product::Model,
    transaction_type: TransactionType,
    cases: i32,
    bottles: i32,
    notes: Option<String>,
) -> Result<inventory_transaction::Model, ServiceError> {
    let moved = total_bottles(cases, bottles, product.bottles_per_case);
    let moved = i32::try_from(moved).map_err(|_| {
        ServiceError::ValidationError(format!(
            "Movement of {} cases and {} bottles of product {} exceeds ledger capacity",
            cases, bottles, product.id
        ))
    })?;

    let audit = inventory_transaction::ActiveModel {
        product_id: Set(product.id),
        transaction_type: Set(transaction_type.to_string()),
        cases_qty: Set(cases),
        bottles_qty: Set(bottles),
        total_bottles: Set(moved),
        total_value: Set(Decimal::from(moved) * product.unit_price),
        notes: Set(notes),
        transaction_date: Set(Utc::now()),
        ..Default::default()
    };

    audit.insert(conn).await.map_err(ServiceError::db_error)
}

/// Decrements the product's ledger row inside the caller's transaction,
/// breaking cases as needed, and appends the REMOVE audit row.
pub async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    product: &product::Model,
    cases: i32,
    bottles: i32,
    notes: Option<String>,
) -> Result<stock_ledger::Model, ServiceError> {
    let ledger = StockLedger::find()
        .filter(stock_ledger::Column::ProductId.eq(product.id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("No stock ledger entry for product {}", product.id))
        })?;

    let plan = plan_decrement(
        ledger.cases_qty,
        ledger.bottles_qty,
        cases,
        bottles,
        product.bottles_per_case,
    )
    .map_err(|s| {
        ServiceError::InsufficientStock(format!(
            "Insufficient stock for product {}: available {} cases and {} bottles, requested {} cases and {} bottles",
            product.id, s.available_cases, s.available_bottles, s.requested_cases, s.requested_bottles
        ))
    })?;

    let updated = apply_plan(conn, &ledger, &plan, product.unit_price).await?;
    record_movement(conn, product, TransactionType::Remove, cases, bottles, notes).await?;

    Ok(updated)
}

fn overflow_error(product_id: i64, cases: i32, bottles: i32) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Adding {} cases and {} bottles would overflow the stock ledger for product {}",
        cases, bottles, product_id
    ))
}

/// Increments the product's ledger row inside the caller's transaction,
/// creating it when missing, and appends the ADD audit row.
pub async fn increment_stock<C: ConnectionTrait>(
    conn: &C,
    product: &product::Model,
    cases: i32,
    bottles: i32,
    notes: Option<String>,
) -> Result<stock_ledger::Model, ServiceError> {
    let existing = StockLedger::find()
        .filter(stock_ledger::Column::ProductId.eq(product.id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let updated = match existing {
        Some(ledger) => {
            let plan = plan_increment(
                ledger.total_bottles,
                cases,
                bottles,
                product.bottles_per_case,
            )
            .map_err(|_| overflow_error(product.id, cases, bottles))?;
            apply_plan(conn, &ledger, &plan, product.unit_price).await?
        }
        None => {
            let plan = plan_increment(0, cases, bottles, product.bottles_per_case)
                .map_err(|_| overflow_error(product.id, cases, bottles))?;
            let fresh = stock_ledger::ActiveModel {
                product_id: Set(product.id),
                cases_qty: Set(plan.cases_qty),
                bottles_qty: Set(plan.bottles_qty),
                total_bottles: Set(plan.total_bottles),
                total_value: Set(plan.total_value(product.unit_price)),
                version: Set(0),
                last_updated: Set(Utc::now()),
                ..Default::default()
            };
            fresh.insert(conn).await.map_err(ServiceError::db_error)?
        }
    };

    record_movement(conn, product, TransactionType::Add, cases, bottles, notes).await?;

    Ok(updated)
}

/// Filters for the audit history query.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    pub from: Option<chrono::DateTime<Utc>>,
    pub to: Option<chrono::DateTime<Utc>>,
}

pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Books received stock into the ledger, creating the row when the
    /// product has never been stocked before.
    #[instrument(skip(self))]
    pub async fn receive_stock(
        &self,
        product_id: i64,
        cases_qty: i32,
        bottles_qty: i32,
        notes: Option<String>,
    ) -> Result<stock_ledger::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let updated = db
            .transaction::<_, stock_ledger::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let product = product::Entity::find_by_id(product_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Product {} not found", product_id))
                        })?;

                    increment_stock(txn, &product, cases_qty, bottles_qty, notes).await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            product_id,
            total_bottles = updated.total_bottles,
            "Stock receipt applied"
        );

        self.event_sender
            .send(Event::StockReceived {
                product_id,
                total_bottles: updated.total_bottles,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Current ledger state for one product.
    #[instrument(skip(self))]
    pub async fn get_stock(&self, product_id: i64) -> Result<stock_ledger::Model, ServiceError> {
        StockLedger::find()
            .filter(stock_ledger::Column::ProductId.eq(product_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No stock ledger entry for product {}", product_id))
            })
    }

    /// Paginated ledger listing, ordered by product.
    #[instrument(skip(self))]
    pub async fn list_stock(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_ledger::Model>, u64), ServiceError> {
        let paginator = StockLedger::find()
            .order_by_asc(stock_ledger::Column::ProductId)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }

    /// Paginated audit history, newest first.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<inventory_transaction::Model>, u64), ServiceError> {
        let mut query = inventory_transaction::Entity::find();

        if let Some(product_id) = filter.product_id {
            query = query.filter(inventory_transaction::Column::ProductId.eq(product_id));
        }
        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(
                inventory_transaction::Column::TransactionType.eq(transaction_type.to_string()),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(inventory_transaction::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(inventory_transaction::Column::TransactionDate.lte(to));
        }

        let paginator = query
            .order_by_desc(inventory_transaction::Column::TransactionDate)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decrement_without_case_breaking() {
        let plan = plan_decrement(5, 10, 2, 4, 24).unwrap();
        assert_eq!(
            plan,
            LedgerPlan {
                cases_qty: 3,
                bottles_qty: 6,
                total_bottles: 78,
            }
        );
    }

    #[test]
    fn decrement_breaks_one_case_and_credits_surplus() {
        // 2 cases + 10 bottles of a 24-pack, asking for 1 case + 20 bottles.
        // One case breaks (cases 1->2, bottles 20->-4), leaving 0 cases and
        // 10 - (-4) = 14 bottles.
        let plan = plan_decrement(2, 10, 1, 20, 24).unwrap();
        assert_eq!(
            plan,
            LedgerPlan {
                cases_qty: 0,
                bottles_qty: 14,
                total_bottles: 14,
            }
        );
    }

    #[test]
    fn decrement_breaks_multiple_cases() {
        // 30 bottles from 3 sealed 12-packs: all three break, the last one
        // crediting 6 bottles back.
        let plan = plan_decrement(3, 0, 0, 30, 12).unwrap();
        assert_eq!(
            plan,
            LedgerPlan {
                cases_qty: 0,
                bottles_qty: 6,
                total_bottles: 6,
            }
        );
    }

    #[test]
    fn decrement_exceeding_total_is_a_shortage() {
        let err = plan_decrement(1, 5, 0, 40, 24).unwrap_err();
        assert_eq!(err.available_cases, 1);
        assert_eq!(err.available_bottles, 5);
        assert_eq!(err.requested_bottles, 40);
    }

    #[test]
    fn decrement_with_too_many_cases_is_a_shortage() {
        assert!(plan_decrement(2, 5, 3, 0, 24).is_err());
    }

    #[test]
    fn decrement_of_everything_empties_the_ledger() {
        let plan = plan_decrement(2, 10, 2, 10, 24).unwrap();
        assert_eq!(plan.total_bottles, 0);
        assert_eq!(plan.cases_qty, 0);
        assert_eq!(plan.bottles_qty, 0);
    }

    #[test]
    fn increment_normalizes_loose_bottles() {
        let plan = plan_increment(58, 0, 20, 24).unwrap();
        assert_eq!(
            plan,
            LedgerPlan {
                cases_qty: 3,
                bottles_qty: 6,
                total_bottles: 78,
            }
        );
    }

    #[test]
    fn increment_into_empty_ledger() {
        let plan = plan_increment(0, 1, 3, 12).unwrap();
        assert_eq!(
            plan,
            LedgerPlan {
                cases_qty: 1,
                bottles_qty: 3,
                total_bottles: 15,
            }
        );
    }

    #[test]
    fn increment_past_ledger_capacity_is_rejected() {
        assert_eq!(plan_increment(0, 100_000_000, 0, 24), Err(Overflow));
        assert_eq!(plan_increment(i32::MAX - 10, 1, 0, 24), Err(Overflow));
    }

    proptest! {
        /// A successful decrement followed by an increment of the same
        /// requested quantities restores the flattened bottle count.
        #[test]
        fn conservation_round_trip(
            on_hand_cases in 0i32..200,
            on_hand_bottles in 0i32..50,
            req_cases in 0i32..50,
            req_bottles in 0i32..200,
            bottles_per_case in 1i32..48,
        ) {
            let before = total_bottles(on_hand_cases, on_hand_bottles, bottles_per_case);
            if let Ok(plan) = plan_decrement(
                on_hand_cases,
                on_hand_bottles,
                req_cases,
                req_bottles,
                bottles_per_case,
            ) {
                let moved = total_bottles(req_cases, req_bottles, bottles_per_case);
                prop_assert_eq!(i64::from(plan.total_bottles), before - moved);

                let restored = plan_increment(
                    plan.total_bottles,
                    req_cases,
                    req_bottles,
                    bottles_per_case,
                )
                .unwrap();
                prop_assert_eq!(i64::from(restored.total_bottles), before);
                prop_assert!(restored.bottles_qty < bottles_per_case);
                prop_assert!(restored.bottles_qty >= 0);
            }
        }

        /// A decrement never produces negative quantities.
        #[test]
        fn decrement_never_goes_negative(
            on_hand_cases in 0i32..100,
            on_hand_bottles in 0i32..100,
            req_cases in 0i32..100,
            req_bottles in 0i32..500,
            bottles_per_case in 1i32..48,
        ) {
            if let Ok(plan) = plan_decrement(
                on_hand_cases,
                on_hand_bottles,
                req_cases,
                req_bottles,
                bottles_per_case,
            ) {
                prop_assert!(plan.cases_qty >= 0);
                prop_assert!(plan.bottles_qty >= 0);
                prop_assert!(plan.total_bottles >= 0);
            }
        }
    }
}
