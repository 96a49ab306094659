pub mod daily_sales;
pub mod loading;
pub mod lorries;
pub mod products;
pub mod stock_ledger;
pub mod unloading;

pub use daily_sales::DailySalesService;
pub use loading::LoadingService;
pub use lorries::LorryService;
pub use products::ProductService;
pub use stock_ledger::StockLedgerService;
pub use unloading::UnloadingService;
