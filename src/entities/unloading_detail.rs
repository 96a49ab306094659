use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One product line of an unloading transaction: goods the lorry brought back.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unloading_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub unloading_id: i64,
    pub product_id: i64,
    pub cases_returned: i32,
    pub bottles_returned: i32,
    pub total_bottles_returned: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unloading_transaction::Entity",
        from = "Column::UnloadingId",
        to = "super::unloading_transaction::Column::Id",
        on_delete = "Cascade"
    )]
    UnloadingTransaction,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::unloading_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnloadingTransaction.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
