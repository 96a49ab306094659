use crate::AppState;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::lorries::list_lorries,
        crate::handlers::lorries::create_lorry,
        crate::handlers::lorries::get_lorry,
        crate::handlers::stock::list_stock,
        crate::handlers::stock::get_stock,
        crate::handlers::stock::receive_stock,
        crate::handlers::stock::list_movements,
        crate::handlers::loading::list_loadings,
        crate::handlers::loading::create_loading,
        crate::handlers::loading::get_loading,
        crate::handlers::loading::update_loading_status,
        crate::handlers::unloading::list_unloadings,
        crate::handlers::unloading::create_unloading,
        crate::handlers::unloading::get_unloading,
        crate::handlers::unloading::update_unloading_status,
        crate::handlers::daily_sales::list_daily_sales,
        crate::handlers::daily_sales::get_daily_sales,
        crate::health::liveness,
        crate::health::readiness,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::entities::inventory_transaction::TransactionType,
        crate::entities::loading_transaction::LoadingStatus,
        crate::entities::unloading_transaction::UnloadingStatus,
        crate::handlers::products::CreateProductRequest,
        crate::handlers::lorries::CreateLorryRequest,
        crate::handlers::stock::StockReceiptRequest,
        crate::handlers::loading::LoadingLineRequest,
        crate::handlers::loading::CreateLoadingRequest,
        crate::handlers::loading::UpdateLoadingStatusRequest,
        crate::handlers::unloading::UnloadingLineRequest,
        crate::handlers::unloading::CreateUnloadingRequest,
        crate::handlers::unloading::UpdateUnloadingStatusRequest,
    )),
    tags(
        (name = "products", description = "Product registry"),
        (name = "lorries", description = "Lorry registry"),
        (name = "stock", description = "Stock ledger and movement history"),
        (name = "loading-transactions", description = "Lorry loading"),
        (name = "unloading-transactions", description = "Lorry unloading and reconciliation"),
        (name = "daily-sales", description = "Derived daily sales records"),
        (name = "health", description = "Service health probes"),
    ),
    info(
        title = "depot-api",
        description = "Warehouse stock ledger and lorry distribution API",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the generated document at
/// `/api-docs/openapi.json`.
pub fn swagger_router() -> Router<AppState> {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
