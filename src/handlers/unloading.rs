use crate::{
    entities::{unloading_transaction, unloading_transaction::UnloadingStatus},
    errors::ServiceError,
    services::unloading::{NewUnloading, UnloadingFilter, UnloadingLine},
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
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

/// Line quantities are checked by the unloading service, which rejects
/// negative lines inside the transaction.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UnloadingLineRequest {
    pub product_id: i64,
    pub cases_returned: i32,
    pub bottles_returned: i32,
}

/// An empty `details` list is valid: the lorry sold everything.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUnloadingRequest {
    pub lorry_id: i64,
    /// Defaults to today (UTC); reconciliation keys off this date
    pub unloading_date: Option<NaiveDate>,
    pub unloading_time: Option<NaiveTime>,
    pub unloaded_by: Option<String>,
    #[serde(default)]
    pub details: Vec<UnloadingLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUnloadingStatusRequest {
    pub status: UnloadingStatus,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UnloadingListQuery {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_unloadings).post(create_unloading))
        .route("/:id", get(get_unloading))
        .route("/:id/status", put(update_unloading_status))
}

/// Create an unloading transaction: return stock, close the lorry's pending
/// loadings, and reconcile the day's sales
#[utoipa::path(
    post,
    path = "/api/v1/unloading-transactions",
    request_body = CreateUnloadingRequest,
    responses(
        (status = 201, description = "Unloading transaction created; reconciled daily sales included"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 404, description = "Lorry or product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent ledger update", body = crate::errors::ErrorResponse)
    ),
    tag = "unloading-transactions"
)]
pub async fn create_unloading(
    State(state): State<AppState>,
    Json(payload): Json<CreateUnloadingRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    payload.validate()?;

    let created = state
        .services
        .unloading
        .create(NewUnloading {
            lorry_id: payload.lorry_id,
            unloading_date: payload.unloading_date,
            unloading_time: payload.unloading_time,
            unloaded_by: payload.unloaded_by,
            details: payload
                .details
                .into_iter()
                .map(|line| UnloadingLine {
                    product_id: line.product_id,
                    cases_returned: line.cases_returned,
                    bottles_returned: line.bottles_returned,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Cancel a completed unloading transaction
#[utoipa::path(
    put,
    path = "/api/v1/unloading-transactions/{id}/status",
    params(("id" = i64, Path, description = "Unloading transaction id")),
    request_body = UpdateUnloadingStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid transition or stock would go negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unloading transaction not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent ledger update", body = crate::errors::ErrorResponse)
    ),
    tag = "unloading-transactions"
)]
pub async fn update_unloading_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUnloadingStatusRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    match payload.status {
        UnloadingStatus::Cancelled => {
            let updated = state.services.unloading.cancel(id).await?;
            Ok(Json(updated))
        }
        UnloadingStatus::Completed => Err(ServiceError::InvalidOperation(
            "An unloading transaction is already Completed when created".into(),
        )),
    }
}

/// Fetch an unloading transaction with its detail lines
#[utoipa::path(
    get,
    path = "/api/v1/unloading-transactions/{id}",
    params(("id" = i64, Path, description = "Unloading transaction id")),
    responses(
        (status = 200, description = "Unloading transaction with details"),
        (status = 404, description = "Unloading transaction not found", body = crate::errors::ErrorResponse)
    ),
    tag = "unloading-transactions"
)]
pub async fn get_unloading(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let (header, details) = state.services.unloading.get(id).await?;
    Ok(Json(json!({
        "header": header,
        "details": details,
    })))
}

/// List unloading transaction headers
#[utoipa::path(
    get,
    path = "/api/v1/unloading-transactions",
    params(UnloadingListQuery),
    responses(
        (status = 200, description = "Paginated unloading transactions"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "unloading-transactions"
)]
pub async fn list_unloadings(
    State(state): State<AppState>,
    Query(query): Query<UnloadingListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let pagination = ListQuery {
        page: query.page,
        per_page: query.per_page,
    };

    let filter = UnloadingFilter {
        lorry_id: query.lorry_id,
        from: query.from,
        to: query.to,
    };

    let (items, total) = state
        .services
        .unloading
        .list(filter, pagination.page(), pagination.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<unloading_transaction::Model>::new(
        items, total, &pagination,
    )))
}
