use crate::{
    db::DbPool,
    entities::lorry::{self, Entity as Lorry},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct NewLorry {
    pub lorry_number: String,
    pub driver_name: Option<String>,
}

pub struct LorryService {
    db_pool: Arc<DbPool>,
}

impl LorryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(lorry_number = %input.lorry_number))]
    pub async fn create(&self, input: NewLorry) -> Result<lorry::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let duplicate = Lorry::find()
            .filter(lorry::Column::LorryNumber.eq(input.lorry_number.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Lorry '{}' is already registered",
                input.lorry_number
            )));
        }

        lorry::ActiveModel {
            lorry_number: Set(input.lorry_number),
            driver_name: Set(input.driver_name),
            active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, lorry_id: i64) -> Result<lorry::Model, ServiceError> {
        Lorry::find_by_id(lorry_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Lorry {} not found", lorry_id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<lorry::Model>, u64), ServiceError> {
        let paginator = Lorry::find()
            .order_by_asc(lorry::Column::LorryNumber)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }
}
