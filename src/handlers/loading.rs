use crate::{
    entities::{loading_transaction, loading_transaction::LoadingStatus},
    services::loading::{LoadingFilter, LoadingLine, NewLoading},
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Line quantities are checked by the loading service, which rejects negative
/// or empty lines inside the transaction.
#[derive(Debug, Deserialize, serde::Serialize, ToSchema)]
pub struct LoadingLineRequest {
    pub product_id: i64,
    pub cases_loaded: i32,
    pub bottles_loaded: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoadingRequest {
    pub lorry_id: i64,
    /// Defaults to today (UTC)
    pub loading_date: Option<NaiveDate>,
    /// Defaults to the current time (UTC)
    pub loading_time: Option<NaiveTime>,
    pub loaded_by: Option<String>,
    #[validate(length(min = 1))]
    pub details: Vec<LoadingLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLoadingStatusRequest {
    pub status: LoadingStatus,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LoadingListQuery {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_loadings).post(create_loading))
        .route("/:id", get(get_loading))
        .route("/:id/status", put(update_loading_status))
}

/// Create a loading transaction, decrementing stock per line
#[utoipa::path(
    post,
    path = "/api/v1/loading-transactions",
    request_body = CreateLoadingRequest,
    responses(
        (status = 201, description = "Loading transaction created with details"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 404, description = "Lorry, product, or ledger row not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent ledger update", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "loading-transactions"
)]
pub async fn create_loading(
    State(state): State<AppState>,
    Json(payload): Json<CreateLoadingRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    payload.validate()?;

    let created = state
        .services
        .loading
        .create(NewLoading {
            lorry_id: payload.lorry_id,
            loading_date: payload.loading_date,
            loading_time: payload.loading_time,
            loaded_by: payload.loaded_by,
            details: payload
                .details
                .into_iter()
                .map(|line| LoadingLine {
                    product_id: line.product_id,
                    cases_loaded: line.cases_loaded,
                    bottles_loaded: line.bottles_loaded,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Move a pending loading transaction to Unloaded or Cancelled
#[utoipa::path(
    put,
    path = "/api/v1/loading-transactions/{id}/status",
    params(("id" = i64, Path, description = "Loading transaction id")),
    request_body = UpdateLoadingStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Loading transaction not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent ledger update", body = crate::errors::ErrorResponse)
    ),
    tag = "loading-transactions"
)]
pub async fn update_loading_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLoadingStatusRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    let updated = state
        .services
        .loading
        .update_status(id, payload.status)
        .await?;

    Ok(Json(updated))
}

/// Fetch a loading transaction with its detail lines
#[utoipa::path(
    get,
    path = "/api/v1/loading-transactions/{id}",
    params(("id" = i64, Path, description = "Loading transaction id")),
    responses(
        (status = 200, description = "Loading transaction with details"),
        (status = 404, description = "Loading transaction not found", body = crate::errors::ErrorResponse)
    ),
    tag = "loading-transactions"
)]
pub async fn get_loading(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let found = state.services.loading.get(id).await?;
    Ok(Json(found))
}

/// List loading transaction headers
#[utoipa::path(
    get,
    path = "/api/v1/loading-transactions",
    params(LoadingListQuery),
    responses(
        (status = 200, description = "Paginated loading transactions"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "loading-transactions"
)]
pub async fn list_loadings(
    State(state): State<AppState>,
    Query(query): Query<LoadingListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let pagination = ListQuery {
        page: query.page,
        per_page: query.per_page,
    };

    let filter = LoadingFilter {
        lorry_id: query.lorry_id,
        from: query.from,
        to: query.to,
    };

    let (items, total) = state
        .services
        .loading
        .list(filter, pagination.page(), pagination.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<loading_transaction::Model>::new(
        items, total, &pagination,
    )))
}
