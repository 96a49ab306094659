use crate::{
    entities::lorry,
    services::lorries::NewLorry,
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLorryRequest {
    #[validate(length(min = 1, max = 64))]
    pub lorry_number: String,
    pub driver_name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lorries).post(create_lorry))
        .route("/:id", get(get_lorry))
}

/// List lorries
#[utoipa::path(
    get,
    path = "/api/v1/lorries",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated lorry list"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "lorries"
)]
pub async fn list_lorries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let (items, total) = state
        .services
        .lorries
        .list(query.page(), query.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<lorry::Model>::new(
        items, total, &query,
    )))
}

/// Register a lorry
#[utoipa::path(
    post,
    path = "/api/v1/lorries",
    request_body = CreateLorryRequest,
    responses(
        (status = 201, description = "Lorry registered"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate lorry number", body = crate::errors::ErrorResponse)
    ),
    tag = "lorries"
)]
pub async fn create_lorry(
    State(state): State<AppState>,
    Json(payload): Json<CreateLorryRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    payload.validate()?;

    let created = state
        .services
        .lorries
        .create(NewLorry {
            lorry_number: payload.lorry_number,
            driver_name: payload.driver_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one lorry
#[utoipa::path(
    get,
    path = "/api/v1/lorries/{id}",
    params(("id" = i64, Path, description = "Lorry id")),
    responses(
        (status = 200, description = "Lorry found"),
        (status = 404, description = "Lorry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "lorries"
)]
pub async fn get_lorry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let found = state.services.lorries.get(id).await?;
    Ok(Json(found))
}
