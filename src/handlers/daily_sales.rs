use crate::{
    entities::daily_sales,
    services::daily_sales::DailySalesFilter,
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DailySalesListQuery {
    pub lorry_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_daily_sales))
        .route("/:id", get(get_daily_sales))
}

/// List reconciled daily sales records
#[utoipa::path(
    get,
    path = "/api/v1/daily-sales",
    params(DailySalesListQuery),
    responses(
        (status = 200, description = "Paginated daily sales records"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "daily-sales"
)]
pub async fn list_daily_sales(
    State(state): State<AppState>,
    Query(query): Query<DailySalesListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let pagination = ListQuery {
        page: query.page,
        per_page: query.per_page,
    };

    let filter = DailySalesFilter {
        lorry_id: query.lorry_id,
        from: query.from,
        to: query.to,
    };

    let (items, total) = state
        .services
        .daily_sales
        .list(filter, pagination.page(), pagination.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<daily_sales::Model>::new(
        items, total, &pagination,
    )))
}

/// Fetch one daily sales record with its per-product breakdown
#[utoipa::path(
    get,
    path = "/api/v1/daily-sales/{id}",
    params(("id" = i64, Path, description = "Daily sales record id")),
    responses(
        (status = 200, description = "Daily sales record with details"),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "daily-sales"
)]
pub async fn get_daily_sales(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let found = state.services.daily_sales.get(id).await?;
    Ok(Json(found))
}
