use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_sales_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sales_id: i64,
    pub product_id: i64,
    pub units_sold: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub sales_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross_profit: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::daily_sales::Entity",
        from = "Column::SalesId",
        to = "super::daily_sales::Column::Id",
        on_delete = "Cascade"
    )]
    DailySales,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::daily_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySales.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
