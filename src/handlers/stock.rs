use crate::{
    entities::{inventory_transaction::TransactionType, stock_ledger},
    services::stock_ledger::MovementFilter,
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockReceiptRequest {
    pub product_id: i64,
    #[validate(range(min = 0, max = 1_000_000))]
    pub cases_qty: i32,
    #[validate(range(min = 0, max = 1_000_000))]
    pub bottles_qty: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MovementQuery {
    pub product_id: Option<i64>,
    /// ADD or REMOVE
    pub transaction_type: Option<TransactionType>,
    /// Inclusive start date (movements from 00:00 UTC)
    pub from: Option<NaiveDate>,
    /// Inclusive end date (movements until 23:59:59 UTC)
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock))
        .route("/receipts", post(receive_stock))
        .route("/transactions", get(list_movements))
        .route("/:product_id", get(get_stock))
}

/// Current stock ledger, paginated
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated stock ledger"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let (items, total) = state
        .services
        .stock
        .list_stock(query.page(), query.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<stock_ledger::Model>::new(
        items, total, &query,
    )))
}

/// Current stock for one product
#[utoipa::path(
    get,
    path = "/api/v1/stock/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Stock ledger row"),
        (status = 404, description = "No ledger entry for product", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let found = state.services.stock.get_stock(product_id).await?;
    Ok(Json(found))
}

/// Book received stock into the ledger
#[utoipa::path(
    post,
    path = "/api/v1/stock/receipts",
    request_body = StockReceiptRequest,
    responses(
        (status = 201, description = "Stock received; updated ledger row returned"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent ledger update", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    Json(payload): Json<StockReceiptRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    payload.validate()?;

    if payload.cases_qty == 0 && payload.bottles_qty == 0 {
        return Err(crate::errors::ServiceError::ValidationError(
            "A stock receipt needs at least one case or bottle".into(),
        ));
    }

    let updated = state
        .services
        .stock
        .receive_stock(
            payload.product_id,
            payload.cases_qty,
            payload.bottles_qty,
            payload.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(updated)))
}

/// Inventory movement audit history
#[utoipa::path(
    get,
    path = "/api/v1/stock/transactions",
    params(MovementQuery),
    responses(
        (status = 200, description = "Paginated movement history"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let pagination = ListQuery {
        page: query.page,
        per_page: query.per_page,
    };

    let filter = MovementFilter {
        product_id: query.product_id,
        transaction_type: query.transaction_type,
        from: query
            .from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
        to: query
            .to
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc()),
    };

    let (items, total) = state
        .services
        .stock
        .list_movements(filter, pagination.page(), pagination.per_page())
        .await?;

    Ok(Json(PaginatedResponse::new(items, total, &pagination)))
}
