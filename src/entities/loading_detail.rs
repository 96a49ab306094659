use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One product line of a loading transaction. Quantities are the originally
/// requested ones; `total_bottles_loaded` flattens them via the product's
/// bottles-per-case at creation time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loading_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub loading_id: i64,
    pub product_id: i64,
    pub cases_loaded: i32,
    pub bottles_loaded: i32,
    pub total_bottles_loaded: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loading_transaction::Entity",
        from = "Column::LoadingId",
        to = "super::loading_transaction::Column::Id",
        on_delete = "Cascade"
    )]
    LoadingTransaction,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::loading_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadingTransaction.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
