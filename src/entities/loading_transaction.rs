use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle of a loading transaction. Headers are immutable after creation
/// apart from this status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, utoipa::ToSchema,
)]
pub enum LoadingStatus {
    Pending,
    Unloaded,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loading_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lorry_id: i64,
    pub loading_date: Date,
    pub loading_time: Time,
    pub loaded_by: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn status(&self) -> Option<LoadingStatus> {
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
    #[sea_orm(has_many = "super::loading_detail::Entity")]
    LoadingDetails,
}

impl Related<super::lorry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lorry.def()
    }
}

impl Related<super::loading_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoadingDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
