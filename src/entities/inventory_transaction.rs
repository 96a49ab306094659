use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Direction of a stock movement in the audit trail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, utoipa::ToSchema,
)]
pub enum TransactionType {
    #[strum(serialize = "ADD")]
    #[serde(rename = "ADD")]
    Add,
    #[strum(serialize = "REMOVE")]
    #[serde(rename = "REMOVE")]
    Remove,
}

/// Append-only record of every stock-affecting event. Rows are never mutated
/// after insert and carry the quantities as originally requested, not the
/// case-broken ones the ledger ended up applying.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    pub transaction_type: String,
    pub cases_qty: i32,
    pub bottles_qty: i32,
    pub total_bottles: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_value: Decimal,
    pub notes: Option<String>,
    pub transaction_date: DateTimeUtc,
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
