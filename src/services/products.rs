use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        application, farm,
        product::{self, ProductCategory},
        product_stock, purchase, purchase_order_item, transfer,
    },
    repositories::{count_where, find_owned, paginate, Page, TenantScoped},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub category: ProductCategory,
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    pub active_ingredient: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub search: Option<String>,
}

/// Balance of a product at one farm.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FarmBalance {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductStockView {
    pub product_id: Uuid,
    pub unit: String,
    pub total: Decimal,
    pub farms: Vec<FarmBalance>,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<product::Model>, ServiceError> {
        let mut query = product::Entity::find_in_tenant(tenant_id);
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(product::Column::Name.contains(search.trim()));
        }
        paginate(
            &*self.db_pool,
            query.order_by_asc(product::Column::Name),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<product::Model, ServiceError> {
        find_owned::<product::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category),
            unit: Set(input.unit),
            active_ingredient: Set(input.active_ingredient),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = %created.id, "product created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        let existing = find_owned::<product::Entity, _>(db, tenant_id, id).await?;

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.category = Set(input.category);
        active.unit = Set(input.unit);
        active.active_ingredient = Set(input.active_ingredient);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<product::Entity, _>(txn, tenant_id, id).await?;

                    let used = count_where::<purchase::Entity, _, _>(
                        txn,
                        tenant_id,
                        purchase::Column::ProductId,
                        id,
                    )
                    .await?
                        + count_where::<transfer::Entity, _, _>(
                            txn,
                            tenant_id,
                            transfer::Column::ProductId,
                            id,
                        )
                        .await?
                        + count_where::<application::Entity, _, _>(
                            txn,
                            tenant_id,
                            application::Column::ProductId,
                            id,
                        )
                        .await?
                        + count_where::<purchase_order_item::Entity, _, _>(
                            txn,
                            tenant_id,
                            purchase_order_item::Column::ProductId,
                            id,
                        )
                        .await?;
                    if used > 0 {
                        return Err(ServiceError::Conflict(format!(
                            "product {} is referenced by purchases, transfers, applications or orders",
                            existing.name
                        )));
                    }

                    product_stock::Entity::delete_many()
                        .filter(product_stock::Column::ProductId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Balances of a product by farm.
    #[instrument(skip(self))]
    pub async fn stock(&self, tenant_id: Uuid, id: Uuid) -> Result<ProductStockView, ServiceError> {
        let db = &*self.db_pool;
        let product = find_owned::<product::Entity, _>(db, tenant_id, id).await?;
        let balances = product
            .find_related(product_stock::Entity)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let farm_names: HashMap<Uuid, String> = farm::Entity::find_in_tenant(tenant_id)
            .filter(farm::Column::Id.is_in(balances.iter().map(|b| b.farm_id)))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect();

        let mut farms: Vec<FarmBalance> = balances
            .into_iter()
            .map(|b| FarmBalance {
                farm_name: farm_names.get(&b.farm_id).cloned().unwrap_or_default(),
                farm_id: b.farm_id,
                quantity: b.quantity,
            })
            .collect();
        farms.sort_by(|a, b| a.farm_name.cmp(&b.farm_name));

        Ok(ProductStockView {
            product_id: product.id,
            unit: product.unit,
            total: farms.iter().map(|f| f.quantity).sum(),
            farms,
        })
    }
}
