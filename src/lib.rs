pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{
    DailySalesService, LoadingService, LorryService, ProductService, StockLedgerService,
    UnloadingService,
};

pub type ApiResult<T> = Result<T, ServiceError>;

/// The service layer, shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub lorries: Arc<LorryService>,
    pub stock: Arc<StockLedgerService>,
    pub loading: Arc<LoadingService>,
    pub unloading: Arc<UnloadingService>,
    pub daily_sales: Arc<DailySalesService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone())),
            lorries: Arc::new(LorryService::new(db_pool.clone())),
            stock: Arc::new(StockLedgerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            loading: Arc::new(LoadingService::new(db_pool.clone(), event_sender.clone())),
            unloading: Arc::new(UnloadingService::new(db_pool.clone(), event_sender)),
            daily_sales: Arc::new(DailySalesService::new(db_pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_pool: Arc<DbPool>, config: Arc<AppConfig>, event_sender: Arc<EventSender>) -> Self {
        let services = AppServices::new(db_pool.clone(), event_sender);
        Self {
            db_pool,
            config,
            services,
        }
    }
}

/// Standard pagination query parameters, shared by the list endpoints.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped at 200
    pub per_page: Option<u64>,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(50).clamp(1, 200)
    }
}

/// Envelope for paginated list responses.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            per_page: query.per_page(),
        }
    }
}

/// All `/api/v1` routes.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::router())
        .nest("/lorries", handlers::lorries::router())
        .nest("/stock", handlers::stock::router())
        .nest("/loading-transactions", handlers::loading::router())
        .nest("/unloading-transactions", handlers::unloading::router())
        .nest("/daily-sales", handlers::daily_sales::router())
}

/// The full application router: versioned API, health probes, swagger UI.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(health::router())
        .merge(openapi::swagger_router())
        .with_state(state)
}
