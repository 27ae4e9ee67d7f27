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
        application, farm,
        machine::{self, MachineKind},
        maintenance, refuel,
    },
    repositories::{count_where, find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::ensure_not_negative,
};

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MachineInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub kind: MachineKind,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2200))]
    pub year: Option<i32>,
    /// Plate or serial number.
    pub identifier: Option<String>,
    #[serde(default)]
    pub hour_meter: Decimal,
    pub farm_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MachineFilter {
    pub kind: Option<MachineKind>,
    pub farm_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
}

impl MachineService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: MachineFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<machine::Model>, ServiceError> {
        use machine::Column;

        let mut query = machine::Entity::find_in_tenant(tenant_id);
        if let Some(kind) = filter.kind {
            query = query.filter(Column::Kind.eq(kind));
        }
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(Column::FarmId.eq(farm_id));
        }
        if let Some(active) = filter.active {
            query = query.filter(Column::Active.eq(active));
        }
        paginate(&*self.db_pool, query.order_by_asc(Column::Name), page, per_page).await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<machine::Model, ServiceError> {
        find_owned::<machine::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: MachineInput,
    ) -> Result<machine::Model, ServiceError> {
        input.validate()?;
        ensure_not_negative("hour_meter", input.hour_meter)?;
        let db = &*self.db_pool;
        if let Some(farm_id) = input.farm_id {
            find_referenced::<farm::Entity, _>(db, tenant_id, farm_id).await?;
        }

        let now = Utc::now();
        let created = machine::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            farm_id: Set(input.farm_id),
            name: Set(input.name.trim().to_string()),
            kind: Set(input.kind),
            brand: Set(input.brand),
            model: Set(input.model),
            year: Set(input.year),
            identifier: Set(input.identifier),
            hour_meter: Set(input.hour_meter),
            active: Set(input.active),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(machine_id = %created.id, "machine registered");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: MachineInput,
    ) -> Result<machine::Model, ServiceError> {
        input.validate()?;
        ensure_not_negative("hour_meter", input.hour_meter)?;
        let db = &*self.db_pool;
        let existing = find_owned::<machine::Entity, _>(db, tenant_id, id).await?;
        if let Some(farm_id) = input.farm_id {
            find_referenced::<farm::Entity, _>(db, tenant_id, farm_id).await?;
        }

        let mut active: machine::ActiveModel = existing.into();
        active.farm_id = Set(input.farm_id);
        active.name = Set(input.name.trim().to_string());
        active.kind = Set(input.kind);
        active.brand = Set(input.brand);
        active.model = Set(input.model);
        active.year = Set(input.year);
        active.identifier = Set(input.identifier);
        active.hour_meter = Set(input.hour_meter);
        active.active = Set(input.active);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = find_owned::<machine::Entity, _>(db, tenant_id, id).await?;

        let history = count_where::<refuel::Entity, _, _>(db, tenant_id, refuel::Column::MachineId, id)
            .await?
            + count_where::<maintenance::Entity, _, _>(
                db,
                tenant_id,
                maintenance::Column::MachineId,
                id,
            )
            .await?
            + count_where::<application::Entity, _, _>(
                db,
                tenant_id,
                application::Column::MachineId,
                id,
            )
            .await?;
        if history > 0 {
            return Err(ServiceError::Conflict(format!(
                "machine {} has refuels, maintenances or applications; deactivate it instead",
                existing.name
            )));
        }

        existing.delete(db).await.map_err(ServiceError::db_error)?;
        info!(machine_id = %id, "machine deleted");
        Ok(())
    }
}
