use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived per-(lorry, date) sales record. Reconciliation upserts these rows;
/// they are never the source of truth, the loading/unloading details are.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lorry_id: i64,
    pub sales_date: Date,
    pub units_sold: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub sales_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross_profit: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lorry::Entity",
        from = "Column::LorryId",
        to = "super::lorry::Column::Id"
    )]
    Lorry,
    #[sea_orm(has_many = "super::daily_sales_detail::Entity")]
    DailySalesDetails,
}

impl Related<super::lorry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lorry.def()
    }
}

impl Related<super::daily_sales_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySalesDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
