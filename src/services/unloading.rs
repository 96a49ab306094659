use crate::{
    db::DbPool,
    entities::{
        inventory_transaction::TransactionType,
        loading_transaction::{self, Entity as LoadingTransaction, LoadingStatus},
        lorry::Entity as Lorry,
        product,
        stock_ledger::{self, Entity as StockLedger},
        unloading_detail::{self, Entity as UnloadingDetail},
        unloading_transaction::{self, Entity as UnloadingTransaction, UnloadingStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        daily_sales,
        stock_ledger::{apply_plan, increment_stock, record_movement, total_bottles, LedgerPlan},
    },
};
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// One returned line of an unloading transaction.
#[derive(Debug, Clone)]
pub struct UnloadingLine {
    pub product_id: i64,
    pub cases_returned: i32,
    pub bottles_returned: i32,
}

/// Service-level input for creating an unloading transaction. An empty detail
/// list is valid: the lorry came back empty, everything sold.
#[derive(Debug, Clone)]
pub struct NewUnloading {
    pub lorry_id: i64,
    pub unloading_date: Option<NaiveDate>,
    pub unloading_time: Option<NaiveTime>,
    pub unloaded_by: Option<String>,
    pub details: Vec<UnloadingLine>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UnloadingWithDetails {
    pub header: unloading_transaction::Model,
    pub details: Vec<unloading_detail::Model>,
    pub daily_sales: daily_sales::DailySalesWithDetails,
}

#[derive(Debug, Clone, Default)]
pub struct UnloadingFilter {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub struct UnloadingService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UnloadingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an unloading transaction: returns stock to the ledger per
    /// line, marks the lorry's pending loadings as unloaded, and reconciles
    /// the day's sales. All of it commits or rolls back together.
    #[instrument(skip(self, input), fields(lorry_id = input.lorry_id, lines = input.details.len()))]
    pub async fn create(&self, input: NewUnloading) -> Result<UnloadingWithDetails, ServiceError> {
        let db = self.db_pool.as_ref();

        let created = db
            .transaction::<_, UnloadingWithDetails, ServiceError>(move |txn| {
                Box::pin(async move {
                    let lorry = Lorry::find_by_id(input.lorry_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Lorry {} not found", input.lorry_id))
                        })?;

                    let now = Utc::now();
                    let unloading_date = input.unloading_date.unwrap_or_else(|| now.date_naive());

                    let header = unloading_transaction::ActiveModel {
                        lorry_id: Set(lorry.id),
                        unloading_date: Set(unloading_date),
                        unloading_time: Set(input.unloading_time.unwrap_or_else(|| now.time())),
                        unloaded_by: Set(input.unloaded_by.clone()),
                        status: Set(UnloadingStatus::Completed.to_string()),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut details = Vec::with_capacity(input.details.len());
                    for line in &input.details {
                        if line.cases_returned < 0 || line.bottles_returned < 0 {
                            return Err(ServiceError::ValidationError(format!(
                                "Unloading line for product {} has negative quantities",
                                line.product_id
                            )));
                        }

                        let product = product::Entity::find_by_id(line.product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    line.product_id
                                ))
                            })?;

                        increment_stock(
                            txn,
                            &product,
                            line.cases_returned,
                            line.bottles_returned,
                            Some(format!(
                                "Unloading transaction {} (lorry {})",
                                header.id, lorry.lorry_number
                            )),
                        )
                        .await?;

                        let line_total = total_bottles(
                            line.cases_returned,
                            line.bottles_returned,
                            product.bottles_per_case,
                        );
                        let line_total = i32::try_from(line_total).map_err(|_| {
                            ServiceError::ValidationError(format!(
                                "Unloading line for product {} exceeds ledger capacity",
                                line.product_id
                            ))
                        })?;

                        let detail = unloading_detail::ActiveModel {
                            unloading_id: Set(header.id),
                            product_id: Set(product.id),
                            cases_returned: Set(line.cases_returned),
                            bottles_returned: Set(line.bottles_returned),
                            total_bottles_returned: Set(line_total),
                            value: Set(Decimal::from(line_total) * product.unit_price),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        details.push(detail);
                    }

                    // The returning lorry closes out its open loadings.
                    LoadingTransaction::update_many()
                        .col_expr(
                            loading_transaction::Column::Status,
                            Expr::value(LoadingStatus::Unloaded.to_string()),
                        )
                        .filter(loading_transaction::Column::LorryId.eq(lorry.id))
                        .filter(
                            loading_transaction::Column::Status
                                .eq(LoadingStatus::Pending.to_string()),
                        )
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let daily = daily_sales::reconcile(txn, lorry.id, unloading_date).await?;

                    Ok(UnloadingWithDetails {
                        header,
                        details,
                        daily_sales: daily,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            unloading_id = created.header.id,
            lorry_id = created.header.lorry_id,
            lines = created.details.len(),
            "Unloading transaction created"
        );

        self.event_sender
            .send(Event::LorryUnloaded {
                unloading_id: created.header.id,
                lorry_id: created.header.lorry_id,
                line_count: created.details.len(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.event_sender
            .send(Event::DailySalesReconciled {
                lorry_id: created.header.lorry_id,
                sales_date: created.header.unloading_date,
                units_sold: created.daily_sales.header.units_sold,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// `Completed -> Cancelled`: takes each returned line back out of the
    /// ledger as-is, without case breaking. A line that would drive a
    /// quantity negative rejects the whole cancellation.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        unloading_id: i64,
    ) -> Result<unloading_transaction::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let updated = db
            .transaction::<_, unloading_transaction::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = UnloadingTransaction::find_by_id(unloading_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Unloading transaction {} not found",
                                unloading_id
                            ))
                        })?;

                    if header.status() != Some(UnloadingStatus::Completed) {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Unloading transaction {} is {} and cannot be cancelled",
                            unloading_id, header.status
                        )));
                    }

                    let details = UnloadingDetail::find()
                        .filter(unloading_detail::Column::UnloadingId.eq(unloading_id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    for detail in details {
                        let product = product::Entity::find_by_id(detail.product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    detail.product_id
                                ))
                            })?;

                        let ledger = StockLedger::find()
                            .filter(stock_ledger::Column::ProductId.eq(detail.product_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "No stock ledger entry for product {}",
                                    detail.product_id
                                ))
                            })?;

                        let new_cases = ledger.cases_qty - detail.cases_returned;
                        let new_bottles = ledger.bottles_qty - detail.bottles_returned;
                        if new_cases < 0 || new_bottles < 0 {
                            return Err(ServiceError::InvalidOperation(format!(
                                "Cancelling unloading transaction {} would drive stock for product {} negative",
                                unloading_id, detail.product_id
                            )));
                        }

                        let plan = LedgerPlan {
                            cases_qty: new_cases,
                            bottles_qty: new_bottles,
                            total_bottles: new_cases * product.bottles_per_case + new_bottles,
                        };
                        apply_plan(txn, &ledger, &plan, product.unit_price).await?;

                        record_movement(
                            txn,
                            &product,
                            TransactionType::Remove,
                            detail.cases_returned,
                            detail.bottles_returned,
                            Some(format!("Cancelled unloading transaction {}", unloading_id)),
                        )
                        .await?;
                    }

                    let lorry_id = header.lorry_id;
                    let sales_date = header.unloading_date;

                    let mut active: unloading_transaction::ActiveModel = header.into();
                    active.status = Set(UnloadingStatus::Cancelled.to_string());
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    // The day's derived sales no longer count this unloading.
                    daily_sales::reconcile(txn, lorry_id, sales_date).await?;

                    Ok(updated)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::UnloadingCancelled {
                unloading_id: updated.id,
                lorry_id: updated.lorry_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// One transaction with its detail rows.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        unloading_id: i64,
    ) -> Result<(unloading_transaction::Model, Vec<unloading_detail::Model>), ServiceError> {
        let db = self.db_pool.as_ref();

        let header = UnloadingTransaction::find_by_id(unloading_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Unloading transaction {} not found", unloading_id))
            })?;

        let details = UnloadingDetail::find()
            .filter(unloading_detail::Column::UnloadingId.eq(unloading_id))
            .order_by_asc(unloading_detail::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((header, details))
    }

    /// Paginated headers, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: UnloadingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<unloading_transaction::Model>, u64), ServiceError> {
        let mut query = UnloadingTransaction::find();

        if let Some(lorry_id) = filter.lorry_id {
            query = query.filter(unloading_transaction::Column::LorryId.eq(lorry_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(unloading_transaction::Column::UnloadingDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(unloading_transaction::Column::UnloadingDate.lte(to));
        }

        let paginator = query
            .order_by_desc(unloading_transaction::Column::UnloadingDate)
            .order_by_desc(unloading_transaction::Column::Id)
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
