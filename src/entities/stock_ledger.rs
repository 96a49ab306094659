use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per product: the current on-hand quantity held redundantly as
/// whole cases plus loose bottles, with the flattened bottle count and value
/// kept in step on every write.
///
/// `version` backs the optimistic compare-and-swap used by every ledger
/// update; see `services::stock_ledger`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub product_id: i64,
    pub cases_qty: i32,
    pub bottles_qty: i32,
    pub total_bottles: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_value: Decimal,
    pub version: i32,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
