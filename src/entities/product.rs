use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product reference data. Immutable as far as the stock ledger and the
/// loading/unloading flows are concerned; they only read `bottles_per_case`
/// and the two prices.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub size: Option<String>,
    pub bottles_per_case: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub selling_price: Decimal,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::stock_ledger::Entity")]
    StockLedger,
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    InventoryTransactions,
}

impl Related<super::stock_ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLedger.def()
    }
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
