use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        buy, cultivar, discard, harvest, industry_sale, planting, sale_contract_item, sale_exit,
    },
    repositories::{count_where, find_owned, paginate, Page, TenantScoped},
    services::stock::ensure_not_negative,
};

fn default_unit() -> String {
    "kg".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CultivarInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub crop: String,
    pub maturity_group: Option<String>,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    /// Opening stock. Only accepted on creation.
    pub stock: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CultivarFilter {
    pub crop: Option<String>,
    /// Only cultivars below their minimum stock.
    pub low_stock: Option<bool>,
}

#[derive(Clone)]
pub struct CultivarService {
    db_pool: Arc<DbPool>,
}

impl CultivarService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: CultivarFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<cultivar::Model>, ServiceError> {
        use cultivar::Column;

        let mut query = cultivar::Entity::find_in_tenant(tenant_id);
        if let Some(crop) = filter.crop {
            query = query.filter(Column::Crop.eq(crop));
        }
        if filter.low_stock == Some(true) {
            query = query.filter(
                Column::MinStock
                    .is_not_null()
                    .and(sea_orm::sea_query::Expr::col(Column::Stock).lt(
                        sea_orm::sea_query::Expr::col(Column::MinStock),
                    )),
            );
        }
        paginate(
            &*self.db_pool,
            query.order_by_asc(Column::Name),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<cultivar::Model, ServiceError> {
        find_owned::<cultivar::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CultivarInput,
    ) -> Result<cultivar::Model, ServiceError> {
        input.validate()?;
        let stock = input.stock.unwrap_or(Decimal::ZERO);
        ensure_not_negative("stock", stock)?;
        if let Some(min_stock) = input.min_stock {
            ensure_not_negative("min_stock", min_stock)?;
        }

        let now = Utc::now();
        let created = cultivar::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            crop: Set(input.crop.trim().to_lowercase()),
            maturity_group: Set(input.maturity_group),
            unit: Set(input.unit),
            stock: Set(stock),
            min_stock: Set(input.min_stock),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(cultivar_id = %created.id, stock = %created.stock, "cultivar created");
        Ok(created)
    }

    /// Updates the descriptive fields. Stock moves only through seed operations.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: CultivarInput,
    ) -> Result<cultivar::Model, ServiceError> {
        input.validate()?;
        if input.stock.is_some() {
            return Err(ServiceError::ValidationError(
                "stock cannot be edited; record a buy, harvest, planting, discard or sale instead"
                    .to_string(),
            ));
        }
        if let Some(min_stock) = input.min_stock {
            ensure_not_negative("min_stock", min_stock)?;
        }

        let db = &*self.db_pool;
        let existing = find_owned::<cultivar::Entity, _>(db, tenant_id, id).await?;
        let mut active: cultivar::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.crop = Set(input.crop.trim().to_lowercase());
        active.maturity_group = Set(input.maturity_group);
        active.unit = Set(input.unit);
        active.min_stock = Set(input.min_stock);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = find_owned::<cultivar::Entity, _>(db, tenant_id, id).await?;

        let movements = count_where::<buy::Entity, _, _>(db, tenant_id, buy::Column::CultivarId, id)
            .await?
            + count_where::<planting::Entity, _, _>(db, tenant_id, planting::Column::CultivarId, id)
                .await?
            + count_where::<harvest::Entity, _, _>(db, tenant_id, harvest::Column::CultivarId, id)
                .await?
            + count_where::<discard::Entity, _, _>(db, tenant_id, discard::Column::CultivarId, id)
                .await?
            + count_where::<sale_exit::Entity, _, _>(db, tenant_id, sale_exit::Column::CultivarId, id)
                .await?
            + count_where::<industry_sale::Entity, _, _>(
                db,
                tenant_id,
                industry_sale::Column::CultivarId,
                id,
            )
            .await?
            + count_where::<sale_contract_item::Entity, _, _>(
                db,
                tenant_id,
                sale_contract_item::Column::CultivarId,
                id,
            )
            .await?;
        if movements > 0 {
            return Err(ServiceError::Conflict(format!(
                "cultivar {} has stock movements or contracts",
                existing.name
            )));
        }

        existing.delete(db).await.map_err(ServiceError::db_error)?;
        info!(cultivar_id = %id, "cultivar deleted");
        Ok(())
    }
}
