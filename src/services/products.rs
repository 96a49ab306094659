use crate::{
    db::DbPool,
    entities::product::{self, Entity as Product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub size: Option<String>,
    pub bottles_per_case: i32,
    pub unit_price: Decimal,
    pub selling_price: Decimal,
}

pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        if input.bottles_per_case <= 0 {
            return Err(ServiceError::ValidationError(
                "bottles_per_case must be positive".into(),
            ));
        }

        let db = self.db_pool.as_ref();

        let duplicate = Product::find()
            .filter(product::Column::Name.eq(input.name.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A product named '{}' already exists",
                input.name
            )));
        }

        product::ActiveModel {
            name: Set(input.name),
            size: Set(input.size),
            bottles_per_case: Set(input.bottles_per_case),
            unit_price: Set(input.unit_price),
            selling_price: Set(input.selling_price),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: i64) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let paginator = Product::find()
            .order_by_asc(product::Column::Name)
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
