pub mod daily_sales;
pub mod loading;
pub mod lorries;
pub mod products;
pub mod stock;
pub mod unloading;
