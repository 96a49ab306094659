use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lorries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub lorry_number: String,
    pub driver_name: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loading_transaction::Entity")]
    LoadingTransactions,
    #[sea_orm(has_many = "super::unloading_transaction::Entity")]
    UnloadingTransactions,
    #[sea_orm(has_many = "super::daily_sales::Entity")]
    DailySales,
}

impl Related<super::loading_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadingTransactions.def()
    }
}

impl Related<super::unloading_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnloadingTransactions.def()
    }
}

impl Related<super::daily_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
