use crate::{
    entities::product,
    services::products::NewProduct,
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub size: Option<String>,
    /// Bottles per sealed case; must be positive
    #[validate(range(min = 1, max = 1_000))]
    pub bottles_per_case: i32,
    /// Cost price per bottle
    pub unit_price: Decimal,
    /// Selling price per bottle
    pub selling_price: Decimal,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated product list"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> crate::ApiResult<impl IntoResponse> {
    let (items, total) = state
        .services
        .products
        .list(query.page(), query.per_page())
        .await?;

    Ok(Json(PaginatedResponse::<product::Model>::new(
        items, total, &query,
    )))
}

/// Register a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate product name", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> crate::ApiResult<impl IntoResponse> {
    payload.validate()?;

    let created = state
        .services
        .products
        .create(NewProduct {
            name: payload.name,
            size: payload.size,
            bottles_per_case: payload.bottles_per_case,
            unit_price: payload.unit_price,
            selling_price: payload.selling_price,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> crate::ApiResult<impl IntoResponse> {
    let found = state.services.products.get(id).await?;
    Ok(Json(found))
}
