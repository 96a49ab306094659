pub mod daily_sales;
pub mod daily_sales_detail;
pub mod inventory_transaction;
pub mod loading_detail;
pub mod loading_transaction;
pub mod lorry;
pub mod product;
pub mod stock_ledger;
pub mod unloading_detail;
pub mod unloading_transaction;
