use crate::{
    db::DbPool,
    entities::{
        daily_sales::{self, Entity as DailySales},
        daily_sales_detail::{self, Entity as DailySalesDetail},
        loading_detail,
        loading_transaction::{self, Entity as LoadingTransaction, LoadingStatus},
        product,
        unloading_detail,
        unloading_transaction::{self, Entity as UnloadingTransaction, UnloadingStatus},
    },
    errors::ServiceError,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, serde::Serialize)]
pub struct DailySalesWithDetails {
    pub header: daily_sales::Model,
    pub details: Vec<daily_sales_detail::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct DailySalesFilter {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Sums `total_bottles_loaded` per product over every non-cancelled loading
/// transaction of the lorry on the given date.
async fn loaded_per_product<C: ConnectionTrait>(
    conn: &C,
    lorry_id: i64,
    date: NaiveDate,
) -> Result<BTreeMap<i64, i64>, ServiceError> {
    let loadings = LoadingTransaction::find()
        .filter(loading_transaction::Column::LorryId.eq(lorry_id))
        .filter(loading_transaction::Column::LoadingDate.eq(date))
        .filter(loading_transaction::Column::Status.ne(LoadingStatus::Cancelled.to_string()))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for loading in &loadings {
        let details = loading
            .find_related(loading_detail::Entity)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        for detail in details {
            *totals.entry(detail.product_id).or_insert(0) += i64::from(detail.total_bottles_loaded);
        }
    }

    Ok(totals)
}

/// Sums `total_bottles_returned` per product over every non-cancelled
/// unloading transaction of the lorry on the given date.
async fn returned_per_product<C: ConnectionTrait>(
    conn: &C,
    lorry_id: i64,
    date: NaiveDate,
) -> Result<BTreeMap<i64, i64>, ServiceError> {
    let unloadings = UnloadingTransaction::find()
        .filter(unloading_transaction::Column::LorryId.eq(lorry_id))
        .filter(unloading_transaction::Column::UnloadingDate.eq(date))
        .filter(unloading_transaction::Column::Status.ne(UnloadingStatus::Cancelled.to_string()))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for unloading in &unloadings {
        let details = unloading
            .find_related(unloading_detail::Entity)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        for detail in details {
            *totals.entry(detail.product_id).or_insert(0) +=
                i64::from(detail.total_bottles_returned);
        }
    }

    Ok(totals)
}

/// Recomputes the derived daily-sales record for one `(lorry, date)` pair.
///
/// Loaded minus returned per product, valued at the product's selling price
/// for income and cost-priced for gross profit. Rows are upserted in place:
/// running this twice over unchanged loadings/unloadings reproduces the same
/// header and detail rows. Must run inside the caller's transaction so the
/// record never reflects a half-written unloading.
pub async fn reconcile<C: ConnectionTrait>(
    conn: &C,
    lorry_id: i64,
    date: NaiveDate,
) -> Result<DailySalesWithDetails, ServiceError> {
    let loaded = loaded_per_product(conn, lorry_id, date).await?;
    let returned = returned_per_product(conn, lorry_id, date).await?;

    let now = Utc::now();

    // Find-or-create the header; the unique (lorry_id, sales_date) index
    // backs the find.
    let header = match DailySales::find()
        .filter(daily_sales::Column::LorryId.eq(lorry_id))
        .filter(daily_sales::Column::SalesDate.eq(date))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
    {
        Some(existing) => existing,
        None => daily_sales::ActiveModel {
            lorry_id: Set(lorry_id),
            sales_date: Set(date),
            units_sold: Set(0),
            sales_income: Set(Decimal::ZERO),
            gross_profit: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(ServiceError::db_error)?,
    };

    for (&product_id, &loaded_total) in &loaded {
        let returned_total = returned.get(&product_id).copied().unwrap_or(0);
        let units_sold = loaded_total - returned_total;

        let existing = DailySalesDetail::find()
            .filter(daily_sales_detail::Column::SalesId.eq(header.id))
            .filter(daily_sales_detail::Column::ProductId.eq(product_id))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;

        if units_sold <= 0 {
            // Everything loaded came back; a stale detail row from an earlier
            // reconciliation has to go.
            if let Some(stale) = existing {
                stale.delete(conn).await.map_err(ServiceError::db_error)?;
            }
            continue;
        }

        let product = product::Entity::find_by_id(product_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", product_id))
            })?;

        let units = i32::try_from(units_sold).map_err(|_| {
            ServiceError::InternalError(format!(
                "Units sold for product {} overflow i32",
                product_id
            ))
        })?;
        let sales_income = Decimal::from(units) * product.selling_price;
        let gross_profit = sales_income - Decimal::from(units) * product.unit_price;

        match existing {
            Some(detail) => {
                let mut active: daily_sales_detail::ActiveModel = detail.into();
                active.units_sold = Set(units);
                active.sales_income = Set(sales_income);
                active.gross_profit = Set(gross_profit);
                active.update(conn).await.map_err(ServiceError::db_error)?;
            }
            None => {
                daily_sales_detail::ActiveModel {
                    sales_id: Set(header.id),
                    product_id: Set(product_id),
                    units_sold: Set(units),
                    sales_income: Set(sales_income),
                    gross_profit: Set(gross_profit),
                    ..Default::default()
                }
                .insert(conn)
                .await
                .map_err(ServiceError::db_error)?;
            }
        }
    }

    // Header totals are always the sum over the surviving detail rows.
    let details = DailySalesDetail::find()
        .filter(daily_sales_detail::Column::SalesId.eq(header.id))
        .order_by_asc(daily_sales_detail::Column::ProductId)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let units_sold: i32 = details.iter().map(|d| d.units_sold).sum();
    let sales_income: Decimal = details.iter().map(|d| d.sales_income).sum();
    let gross_profit: Decimal = details.iter().map(|d| d.gross_profit).sum();

    let mut active: daily_sales::ActiveModel = header.into();
    active.units_sold = Set(units_sold);
    active.sales_income = Set(sales_income);
    active.gross_profit = Set(gross_profit);
    active.updated_at = Set(now);
    let header = active.update(conn).await.map_err(ServiceError::db_error)?;

    info!(
        lorry_id,
        %date,
        units_sold,
        "Daily sales reconciled"
    );

    Ok(DailySalesWithDetails { header, details })
}

pub struct DailySalesService {
    db_pool: Arc<DbPool>,
}

impl DailySalesService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// One daily-sales record with its per-product breakdown.
    #[instrument(skip(self))]
    pub async fn get(&self, sales_id: i64) -> Result<DailySalesWithDetails, ServiceError> {
        let db = self.db_pool.as_ref();

        let header = DailySales::find_by_id(sales_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Daily sales record {} not found", sales_id))
            })?;

        let details = DailySalesDetail::find()
            .filter(daily_sales_detail::Column::SalesId.eq(sales_id))
            .order_by_asc(daily_sales_detail::Column::ProductId)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(DailySalesWithDetails { header, details })
    }

    /// Paginated headers, newest date first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DailySalesFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<daily_sales::Model>, u64), ServiceError> {
        let mut query = DailySales::find();

        if let Some(lorry_id) = filter.lorry_id {
            query = query.filter(daily_sales::Column::LorryId.eq(lorry_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(daily_sales::Column::SalesDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(daily_sales::Column::SalesDate.lte(to));
        }

        let paginator = query
            .order_by_desc(daily_sales::Column::SalesDate)
            .order_by_desc(daily_sales::Column::Id)
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
