use crate::{
    db::DbPool,
    entities::{
        loading_detail::{self, Entity as LoadingDetail},
        loading_transaction::{self, Entity as LoadingTransaction, LoadingStatus},
        lorry::Entity as Lorry,
        product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_ledger::{decrement_stock, increment_stock, total_bottles},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// One requested line of a loading transaction.
#[derive(Debug, Clone)]
pub struct LoadingLine {
    pub product_id: i64,
    pub cases_loaded: i32,
    pub bottles_loaded: i32,
}

/// Service-level input for creating a loading transaction.
#[derive(Debug, Clone)]
pub struct NewLoading {
    pub lorry_id: i64,
    pub loading_date: Option<NaiveDate>,
    pub loading_time: Option<NaiveTime>,
    pub loaded_by: Option<String>,
    pub details: Vec<LoadingLine>,
}

/// Header plus detail rows, as returned to callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadingWithDetails {
    pub header: loading_transaction::Model,
    pub details: Vec<loading_detail::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadingFilter {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub struct LoadingService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LoadingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a loading transaction, decrementing the stock ledger per line.
    /// Any failing line rolls back the header, details, ledger writes and
    /// audit rows together.
    #[instrument(skip(self, input), fields(lorry_id = input.lorry_id, lines = input.details.len()))]
    pub async fn create(&self, input: NewLoading) -> Result<LoadingWithDetails, ServiceError> {
        if input.details.is_empty() {
            return Err(ServiceError::ValidationError(
                "A loading transaction needs at least one detail line".into(),
            ));
        }

        let db = self.db_pool.as_ref();

        let created = db
            .transaction::<_, LoadingWithDetails, ServiceError>(move |txn| {
                Box::pin(async move {
                    let lorry = Lorry::find_by_id(input.lorry_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Lorry {} not found", input.lorry_id))
                        })?;

                    let now = Utc::now();
                    let header = loading_transaction::ActiveModel {
                        lorry_id: Set(lorry.id),
                        loading_date: Set(input.loading_date.unwrap_or_else(|| now.date_naive())),
                        loading_time: Set(input.loading_time.unwrap_or_else(|| now.time())),
                        loaded_by: Set(input.loaded_by.clone()),
                        status: Set(LoadingStatus::Pending.to_string()),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut details = Vec::with_capacity(input.details.len());
                    for line in &input.details {
                        if line.cases_loaded < 0 || line.bottles_loaded < 0 {
                            return Err(ServiceError::ValidationError(format!(
                                "Loading line for product {} has negative quantities",
                                line.product_id
                            )));
                        }
                        if line.cases_loaded == 0 && line.bottles_loaded == 0 {
                            return Err(ServiceError::ValidationError(format!(
                                "Loading line for product {} requests nothing",
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

                        decrement_stock(
                            txn,
                            &product,
                            line.cases_loaded,
                            line.bottles_loaded,
                            Some(format!(
                                "Loading transaction {} (lorry {})",
                                header.id, lorry.lorry_number
                            )),
                        )
                        .await?;

                        let line_total = total_bottles(
                            line.cases_loaded,
                            line.bottles_loaded,
                            product.bottles_per_case,
                        );
                        let line_total = i32::try_from(line_total).map_err(|_| {
                            ServiceError::ValidationError(format!(
                                "Loading line for product {} exceeds ledger capacity",
                                line.product_id
                            ))
                        })?;

                        let detail = loading_detail::ActiveModel {
                            loading_id: Set(header.id),
                            product_id: Set(product.id),
                            cases_loaded: Set(line.cases_loaded),
                            bottles_loaded: Set(line.bottles_loaded),
                            total_bottles_loaded: Set(line_total),
                            value: Set(Decimal::from(line_total) * product.unit_price),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        details.push(detail);
                    }

                    Ok(LoadingWithDetails { header, details })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            loading_id = created.header.id,
            lorry_id = created.header.lorry_id,
            lines = created.details.len(),
            "Loading transaction created"
        );

        self.event_sender
            .send(Event::LorryLoaded {
                loading_id: created.header.id,
                lorry_id: created.header.lorry_id,
                line_count: created.details.len(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Transitions a loading transaction out of `Pending`. Cancellation
    /// returns every loaded line to the stock ledger through the increment
    /// path; marking as `Unloaded` is bookkeeping only.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        loading_id: i64,
        new_status: LoadingStatus,
    ) -> Result<loading_transaction::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let updated = db
            .transaction::<_, loading_transaction::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = LoadingTransaction::find_by_id(loading_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Loading transaction {} not found",
                                loading_id
                            ))
                        })?;

                    if header.status() != Some(LoadingStatus::Pending) {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Loading transaction {} is {} and can no longer change status",
                            loading_id, header.status
                        )));
                    }

                    match new_status {
                        LoadingStatus::Pending => {
                            return Err(ServiceError::InvalidOperation(
                                "A loading transaction is already Pending when created".into(),
                            ));
                        }
                        LoadingStatus::Unloaded => {}
                        LoadingStatus::Cancelled => {
                            let details = LoadingDetail::find()
                                .filter(loading_detail::Column::LoadingId.eq(loading_id))
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

                                increment_stock(
                                    txn,
                                    &product,
                                    detail.cases_loaded,
                                    detail.bottles_loaded,
                                    Some(format!("Cancelled loading transaction {}", loading_id)),
                                )
                                .await?;
                            }
                        }
                    }

                    let mut active: loading_transaction::ActiveModel = header.into();
                    active.status = Set(new_status.to_string());
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if new_status == LoadingStatus::Cancelled {
            self.event_sender
                .send(Event::LoadingCancelled {
                    loading_id: updated.id,
                    lorry_id: updated.lorry_id,
                })
                .await
                .map_err(ServiceError::EventError)?;
        }

        Ok(updated)
    }

    /// One transaction with its detail rows.
    #[instrument(skip(self))]
    pub async fn get(&self, loading_id: i64) -> Result<LoadingWithDetails, ServiceError> {
        let db = self.db_pool.as_ref();

        let header = LoadingTransaction::find_by_id(loading_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Loading transaction {} not found", loading_id))
            })?;

        let details = LoadingDetail::find()
            .filter(loading_detail::Column::LoadingId.eq(loading_id))
            .order_by_asc(loading_detail::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(LoadingWithDetails { header, details })
    }

    /// Paginated headers, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: LoadingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<loading_transaction::Model>, u64), ServiceError> {
        let mut query = LoadingTransaction::find();

        if let Some(lorry_id) = filter.lorry_id {
            query = query.filter(loading_transaction::Column::LorryId.eq(lorry_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(loading_transaction::Column::LoadingDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(loading_transaction::Column::LoadingDate.lte(to));
        }

        let paginator = query
            .order_by_desc(loading_transaction::Column::LoadingDate)
            .order_by_desc(loading_transaction::Column::Id)
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
