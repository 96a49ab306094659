use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, utoipa::ToSchema,
)]
pub enum UnloadingStatus {
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unloading_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lorry_id: i64,
    pub unloading_date: Date,
    pub unloading_time: Time,
    pub unloaded_by: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn status(&self) -> Option<UnloadingStatus> {
        self.status.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lorry::Entity",
        from = "Column::LorryId",
        to = "super::lorry::Column::Id"
    )]
    Lorry,
    #[sea_orm(has_many = "super::unloading_detail::Entity")]
    UnloadingDetails,
}

impl Related<super::lorry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lorry.def()
    }
}

impl Related<super::unloading_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnloadingDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
