//! Input applications: a product used on a plot, consuming the farm's stock.

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

use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{application, machine, plot, product},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::{adjust_product_stock, ensure_positive, input_stock_event},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationInput {
    pub product_id: Uuid,
    pub farm_id: Uuid,
    pub plot_id: Uuid,
    pub machine_id: Option<Uuid>,
    pub quantity: Decimal,
    pub area_ha: Option<Decimal>,
    pub application_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ApplicationFilter {
    pub product_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub plot_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn check(input: &ApplicationInput) -> Result<(), ServiceError> {
    ensure_positive("quantity", input.quantity)?;
    if let Some(area) = input.area_ha {
        ensure_positive("area_ha", area)?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct ApplicationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ApplicationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: ApplicationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<application::Model>, ServiceError> {
        use application::Column;

        let mut query = application::Entity::find_in_tenant(tenant_id);
        if let Some(product_id) = filter.product_id {
            query = query.filter(Column::ProductId.eq(product_id));
        }
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(Column::FarmId.eq(farm_id));
        }
        if let Some(plot_id) = filter.plot_id {
            query = query.filter(Column::PlotId.eq(plot_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::ApplicationDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::ApplicationDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::ApplicationDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<application::Model, ServiceError> {
        find_owned::<application::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: ApplicationInput,
    ) -> Result<application::Model, ServiceError> {
        check(&input)?;

        let (created, event) = self
            .db_pool
            .transaction::<_, (application::Model, Event), ServiceError>(|txn| {
                Box::pin(async move {
                    check_references(txn, tenant_id, &input).await?;
                    let now = Utc::now();
                    let created = application::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..active_from(&input)
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let event = consume(txn, &created, created.quantity).await?;
                    Ok((created, event))
                })
            })
            .await?;

        info!(application_id = %created.id, "input application recorded");
        self.event_sender.send_or_log(event).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: ApplicationInput,
    ) -> Result<application::Model, ServiceError> {
        check(&input)?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (application::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<application::Entity, _>(txn, tenant_id, id).await?;
                    let restored = consume(txn, &existing, -existing.quantity).await?;

                    check_references(txn, tenant_id, &input).await?;
                    let mut active = active_from(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    let consumed = consume(txn, &updated, updated.quantity).await?;
                    Ok((updated, vec![restored, consumed]))
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        Ok(updated)
    }

    /// Deletes the application and returns its quantity to the farm stock.
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let event = self
            .db_pool
            .transaction::<_, Event, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<application::Entity, _>(txn, tenant_id, id).await?;
                    let event = consume(txn, &existing, -existing.quantity).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(event)
                })
            })
            .await?;

        self.event_sender.send_or_log(event).await;
        Ok(())
    }
}

fn active_from(input: &ApplicationInput) -> application::ActiveModel {
    application::ActiveModel {
        product_id: Set(input.product_id),
        farm_id: Set(input.farm_id),
        plot_id: Set(input.plot_id),
        machine_id: Set(input.machine_id),
        quantity: Set(input.quantity),
        area_ha: Set(input.area_ha),
        application_date: Set(input.application_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    input: &ApplicationInput,
) -> Result<(), ServiceError> {
    find_referenced::<product::Entity, _>(db, tenant_id, input.product_id).await?;
    let plot = find_referenced::<plot::Entity, _>(db, tenant_id, input.plot_id).await?;
    if plot.farm_id != input.farm_id {
        return Err(ServiceError::ValidationError(format!(
            "plot {} does not belong to farm {}",
            plot.name, input.farm_id
        )));
    }
    if let Some(machine_id) = input.machine_id {
        find_referenced::<machine::Entity, _>(db, tenant_id, machine_id).await?;
    }
    Ok(())
}

/// Withdraws `quantity` from the farm stock; a negative quantity gives it back.
async fn consume<C: ConnectionTrait>(
    db: &C,
    application: &application::Model,
    quantity: Decimal,
) -> Result<Event, ServiceError> {
    let balance = adjust_product_stock(
        db,
        application.tenant_id,
        application.product_id,
        application.farm_id,
        -quantity,
    )
    .await?;
    let reason = if quantity.is_sign_negative() {
        "application reverted"
    } else {
        "application"
    };
    Ok(input_stock_event(&balance, reason))
}
