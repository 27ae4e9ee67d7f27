//! Machine maintenances. A maintenance on term opens a payable to the
//! workshop; once that payable is paid the record can no longer change.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
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
        customer, machine,
        maintenance::{self, MaintenanceKind},
        PaymentTerm,
    },
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::{
        finance::{close_payable, open_payable, PayableOrigin, Settlement},
        stock::ensure_not_negative,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MaintenanceInput {
    pub machine_id: Uuid,
    pub kind: MaintenanceKind,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub maintenance_date: NaiveDate,
    pub hour_meter: Option<Decimal>,
    pub cost: Decimal,
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
}

impl MaintenanceInput {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        ensure_not_negative("cost", self.cost)?;
        if let Some(reading) = self.hour_meter {
            ensure_not_negative("hour_meter", reading)?;
        }
        Settlement {
            payment: self.payment,
            due_date: self.due_date,
        }
        .validate()
    }

    fn active(&self) -> maintenance::ActiveModel {
        maintenance::ActiveModel {
            machine_id: Set(self.machine_id),
            kind: Set(self.kind),
            description: Set(self.description.trim().to_string()),
            maintenance_date: Set(self.maintenance_date),
            hour_meter: Set(self.hour_meter),
            cost: Set(self.cost.round_dp(2)),
            supplier_id: Set(self.supplier_id),
            payment: Set(self.payment),
            due_date: Set(self.due_date),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MaintenanceFilter {
    pub machine_id: Option<Uuid>,
    pub kind: Option<MaintenanceKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct MaintenanceService {
    db_pool: Arc<DbPool>,
}

impl MaintenanceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: MaintenanceFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<maintenance::Model>, ServiceError> {
        use maintenance::Column;

        let mut query = maintenance::Entity::find_in_tenant(tenant_id);
        if let Some(machine_id) = filter.machine_id {
            query = query.filter(Column::MachineId.eq(machine_id));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(Column::Kind.eq(kind));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::MaintenanceDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::MaintenanceDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::MaintenanceDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<maintenance::Model, ServiceError> {
        find_owned::<maintenance::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(machine_id = %input.machine_id))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: MaintenanceInput,
    ) -> Result<maintenance::Model, ServiceError> {
        input.check()?;

        let created = self
            .db_pool
            .transaction::<_, maintenance::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    check_references(txn, tenant_id, &input).await?;
                    let now = Utc::now();
                    let created = maintenance::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..input.active()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    open(txn, &created).await?;
                    Ok(created)
                })
            })
            .await?;

        info!(maintenance_id = %created.id, cost = %created.cost, "maintenance recorded");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: MaintenanceInput,
    ) -> Result<maintenance::Model, ServiceError> {
        input.check()?;

        let updated = self
            .db_pool
            .transaction::<_, maintenance::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<maintenance::Entity, _>(txn, tenant_id, id).await?;
                    close_payable(
                        txn,
                        tenant_id,
                        PayableOrigin::Maintenance(existing.id),
                        "maintenance",
                    )
                    .await?;

                    check_references(txn, tenant_id, &input).await?;
                    let mut active = input.active();
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    open(txn, &updated).await?;
                    Ok(updated)
                })
            })
            .await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<maintenance::Entity, _>(txn, tenant_id, id).await?;
                    close_payable(
                        txn,
                        tenant_id,
                        PayableOrigin::Maintenance(existing.id),
                        "maintenance",
                    )
                    .await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(maintenance_id = %id, "maintenance deleted");
        Ok(())
    }
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    input: &MaintenanceInput,
) -> Result<(), ServiceError> {
    find_referenced::<machine::Entity, _>(db, tenant_id, input.machine_id).await?;
    if let Some(supplier_id) = input.supplier_id {
        find_referenced::<customer::Entity, _>(db, tenant_id, supplier_id).await?;
    }
    Ok(())
}

async fn open<C: ConnectionTrait>(
    db: &C,
    maintenance: &maintenance::Model,
) -> Result<(), ServiceError> {
    open_payable(
        db,
        maintenance.tenant_id,
        PayableOrigin::Maintenance(maintenance.id),
        maintenance.supplier_id,
        format!("Maintenance: {}", maintenance.description),
        maintenance.cost,
        Settlement {
            payment: maintenance.payment,
            due_date: maintenance.due_date,
        },
    )
    .await
    .map(|_| ())
}
