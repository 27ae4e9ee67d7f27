//! Seed stock movements other than sales: buys, plantings, harvests and discards.

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
    events::{Event, EventSender},
    models::{buy, customer, discard, harvest, planting, plot, PaymentTerm},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::{
        finance::{close_payable, open_payable, PayableOrigin, Settlement},
        stock::{
            adjust_cultivar_stock, cultivar_stock_events, ensure_not_negative, ensure_positive,
            line_total,
        },
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BuyInput {
    pub cultivar_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub buy_date: NaiveDate,
    #[validate(length(max = 64))]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlantingInput {
    pub cultivar_id: Uuid,
    pub plot_id: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub season: String,
    pub quantity: Decimal,
    pub area_ha: Option<Decimal>,
    pub planting_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct HarvestInput {
    pub cultivar_id: Uuid,
    pub plot_id: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub season: String,
    pub quantity: Decimal,
    pub harvest_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DiscardInput {
    pub cultivar_id: Uuid,
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
    pub discard_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SeedMovementFilter {
    pub cultivar_id: Option<Uuid>,
    /// Plantings and harvests only.
    pub plot_id: Option<Uuid>,
    /// Plantings and harvests only.
    pub season: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Records that move a cultivar's stock by a signed quantity.
trait SeedMovement {
    fn cultivar_id(&self) -> Uuid;
    /// Signed effect on the cultivar stock when the record exists.
    fn stock_delta(&self) -> Decimal;
}

impl SeedMovement for buy::Model {
    fn cultivar_id(&self) -> Uuid {
        self.cultivar_id
    }
    fn stock_delta(&self) -> Decimal {
        self.quantity
    }
}

impl SeedMovement for planting::Model {
    fn cultivar_id(&self) -> Uuid {
        self.cultivar_id
    }
    fn stock_delta(&self) -> Decimal {
        -self.quantity
    }
}

impl SeedMovement for harvest::Model {
    fn cultivar_id(&self) -> Uuid {
        self.cultivar_id
    }
    fn stock_delta(&self) -> Decimal {
        self.quantity
    }
}

impl SeedMovement for discard::Model {
    fn cultivar_id(&self) -> Uuid {
        self.cultivar_id
    }
    fn stock_delta(&self) -> Decimal {
        -self.quantity
    }
}

async fn move_stock<C: ConnectionTrait, M: SeedMovement>(
    db: &C,
    tenant_id: Uuid,
    record: &M,
    sign: Decimal,
    reason: &str,
) -> Result<Vec<Event>, ServiceError> {
    let (cultivar, before) =
        adjust_cultivar_stock(db, tenant_id, record.cultivar_id(), record.stock_delta() * sign)
            .await?;
    Ok(cultivar_stock_events(&cultivar, before, reason))
}

async fn apply<C: ConnectionTrait, M: SeedMovement>(
    db: &C,
    tenant_id: Uuid,
    record: &M,
    reason: &str,
) -> Result<Vec<Event>, ServiceError> {
    move_stock(db, tenant_id, record, Decimal::ONE, reason).await
}

async fn revert<C: ConnectionTrait, M: SeedMovement>(
    db: &C,
    tenant_id: Uuid,
    record: &M,
    reason: &str,
) -> Result<Vec<Event>, ServiceError> {
    move_stock(db, tenant_id, record, Decimal::NEGATIVE_ONE, reason).await
}

fn buy_description(buy: &buy::Model) -> String {
    match &buy.invoice_number {
        Some(invoice) => format!("Seed purchase, invoice {}", invoice),
        None => format!("Seed purchase of {}", buy.buy_date),
    }
}

async fn ensure_plot<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    plot_id: Uuid,
) -> Result<plot::Model, ServiceError> {
    find_referenced::<plot::Entity, _>(db, tenant_id, plot_id).await
}

#[derive(Clone)]
pub struct SeedMovementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SeedMovementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn publish(&self, events: Vec<Event>) {
        for event in events {
            self.event_sender.send_or_log(event).await;
        }
    }

    // Buys

    pub async fn list_buys(
        &self,
        tenant_id: Uuid,
        filter: SeedMovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<buy::Model>, ServiceError> {
        use buy::Column;

        let mut query = buy::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::BuyDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::BuyDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::BuyDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_buy(&self, tenant_id: Uuid, id: Uuid) -> Result<buy::Model, ServiceError> {
        find_owned::<buy::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_buy(&self, tenant_id: Uuid, input: BuyInput) -> Result<buy::Model, ServiceError> {
        check_buy(&input)?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (buy::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.supplier_id)
                        .await?;
                    let now = Utc::now();
                    let created = buy::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..buy_active(&input)?
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply_buy(txn, &created).await?;
                    Ok((created, events))
                })
            })
            .await?;

        info!(buy_id = %created.id, quantity = %created.quantity, "seed purchase recorded");
        self.publish(events).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_buy(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: BuyInput,
    ) -> Result<buy::Model, ServiceError> {
        check_buy(&input)?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (buy::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<buy::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert_buy(txn, &existing).await?;

                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.supplier_id)
                        .await?;
                    let mut active = buy_active(&input)?;
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply_buy(txn, &updated).await?);
                    Ok((updated, events))
                })
            })
            .await?;

        self.publish(events).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_buy(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<buy::Entity, _>(txn, tenant_id, id).await?;
                    let events = revert_buy(txn, &existing).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        self.publish(events).await;
        Ok(())
    }

    // Plantings

    pub async fn list_plantings(
        &self,
        tenant_id: Uuid,
        filter: SeedMovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<planting::Model>, ServiceError> {
        use planting::Column;

        let mut query = planting::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(plot_id) = filter.plot_id {
            query = query.filter(Column::PlotId.eq(plot_id));
        }
        if let Some(season) = filter.season {
            query = query.filter(Column::Season.eq(season));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::PlantingDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::PlantingDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::PlantingDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_planting(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<planting::Model, ServiceError> {
        find_owned::<planting::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_planting(
        &self,
        tenant_id: Uuid,
        input: PlantingInput,
    ) -> Result<planting::Model, ServiceError> {
        check_planting(&input)?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (planting::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    ensure_plot(txn, tenant_id, input.plot_id).await?;
                    let now = Utc::now();
                    let created = planting::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..planting_active(&input)
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply(txn, tenant_id, &created, "planting").await?;
                    Ok((created, events))
                })
            })
            .await?;

        info!(planting_id = %created.id, season = %created.season, "planting recorded");
        self.publish(events).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_planting(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PlantingInput,
    ) -> Result<planting::Model, ServiceError> {
        check_planting(&input)?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (planting::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<planting::Entity, _>(txn, tenant_id, id).await?;
                    let mut events =
                        revert(txn, tenant_id, &existing, "planting reverted").await?;

                    ensure_plot(txn, tenant_id, input.plot_id).await?;
                    let mut active = planting_active(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply(txn, tenant_id, &updated, "planting").await?);
                    Ok((updated, events))
                })
            })
            .await?;

        self.publish(events).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_planting(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<planting::Entity, _>(txn, tenant_id, id).await?;
                    let events = revert(txn, tenant_id, &existing, "planting reverted").await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        self.publish(events).await;
        Ok(())
    }

    // Harvests

    pub async fn list_harvests(
        &self,
        tenant_id: Uuid,
        filter: SeedMovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<harvest::Model>, ServiceError> {
        use harvest::Column;

        let mut query = harvest::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(plot_id) = filter.plot_id {
            query = query.filter(Column::PlotId.eq(plot_id));
        }
        if let Some(season) = filter.season {
            query = query.filter(Column::Season.eq(season));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::HarvestDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::HarvestDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::HarvestDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_harvest(&self, tenant_id: Uuid, id: Uuid) -> Result<harvest::Model, ServiceError> {
        find_owned::<harvest::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_harvest(
        &self,
        tenant_id: Uuid,
        input: HarvestInput,
    ) -> Result<harvest::Model, ServiceError> {
        check_harvest(&input)?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (harvest::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    ensure_plot(txn, tenant_id, input.plot_id).await?;
                    let now = Utc::now();
                    let created = harvest::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..harvest_active(&input)
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply(txn, tenant_id, &created, "harvest").await?;
                    Ok((created, events))
                })
            })
            .await?;

        info!(harvest_id = %created.id, quantity = %created.quantity, "harvest recorded");
        self.publish(events).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_harvest(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: HarvestInput,
    ) -> Result<harvest::Model, ServiceError> {
        check_harvest(&input)?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (harvest::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<harvest::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert(txn, tenant_id, &existing, "harvest reverted").await?;

                    ensure_plot(txn, tenant_id, input.plot_id).await?;
                    let mut active = harvest_active(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply(txn, tenant_id, &updated, "harvest").await?);
                    Ok((updated, events))
                })
            })
            .await?;

        self.publish(events).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_harvest(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<harvest::Entity, _>(txn, tenant_id, id).await?;
                    let events = revert(txn, tenant_id, &existing, "harvest reverted").await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        self.publish(events).await;
        Ok(())
    }

    // Discards

    pub async fn list_discards(
        &self,
        tenant_id: Uuid,
        filter: SeedMovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<discard::Model>, ServiceError> {
        use discard::Column;

        let mut query = discard::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::DiscardDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::DiscardDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::DiscardDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_discard(&self, tenant_id: Uuid, id: Uuid) -> Result<discard::Model, ServiceError> {
        find_owned::<discard::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_discard(
        &self,
        tenant_id: Uuid,
        input: DiscardInput,
    ) -> Result<discard::Model, ServiceError> {
        input.validate()?;
        ensure_positive("quantity", input.quantity)?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (discard::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let created = discard::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..discard_active(&input)
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply(txn, tenant_id, &created, "discard").await?;
                    Ok((created, events))
                })
            })
            .await?;

        info!(discard_id = %created.id, reason = %created.reason, "seed discard recorded");
        self.publish(events).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_discard(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: DiscardInput,
    ) -> Result<discard::Model, ServiceError> {
        input.validate()?;
        ensure_positive("quantity", input.quantity)?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (discard::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<discard::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert(txn, tenant_id, &existing, "discard reverted").await?;

                    let mut active = discard_active(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply(txn, tenant_id, &updated, "discard").await?);
                    Ok((updated, events))
                })
            })
            .await?;

        self.publish(events).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_discard(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<discard::Entity, _>(txn, tenant_id, id).await?;
                    let events = revert(txn, tenant_id, &existing, "discard reverted").await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        self.publish(events).await;
        Ok(())
    }
}

fn check_buy(input: &BuyInput) -> Result<(), ServiceError> {
    input.validate()?;
    ensure_positive("quantity", input.quantity)?;
    ensure_not_negative("unit_price", input.unit_price)?;
    Settlement {
        payment: input.payment,
        due_date: input.due_date,
    }
    .validate()
}

fn check_planting(input: &PlantingInput) -> Result<(), ServiceError> {
    input.validate()?;
    ensure_positive("quantity", input.quantity)?;
    if let Some(area) = input.area_ha {
        ensure_positive("area_ha", area)?;
    }
    Ok(())
}

fn check_harvest(input: &HarvestInput) -> Result<(), ServiceError> {
    input.validate()?;
    ensure_positive("quantity", input.quantity)
}

fn buy_active(input: &BuyInput) -> Result<buy::ActiveModel, ServiceError> {
    Ok(buy::ActiveModel {
        cultivar_id: Set(input.cultivar_id),
        supplier_id: Set(input.supplier_id),
        quantity: Set(input.quantity),
        unit_price: Set(input.unit_price),
        total_value: Set(line_total(input.quantity, input.unit_price, Decimal::ZERO)?),
        buy_date: Set(input.buy_date),
        invoice_number: Set(input.invoice_number.clone()),
        payment: Set(input.payment),
        due_date: Set(input.due_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    })
}

fn planting_active(input: &PlantingInput) -> planting::ActiveModel {
    planting::ActiveModel {
        cultivar_id: Set(input.cultivar_id),
        plot_id: Set(input.plot_id),
        season: Set(input.season.trim().to_string()),
        quantity: Set(input.quantity),
        area_ha: Set(input.area_ha),
        planting_date: Set(input.planting_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

fn harvest_active(input: &HarvestInput) -> harvest::ActiveModel {
    harvest::ActiveModel {
        cultivar_id: Set(input.cultivar_id),
        plot_id: Set(input.plot_id),
        season: Set(input.season.trim().to_string()),
        quantity: Set(input.quantity),
        harvest_date: Set(input.harvest_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

fn discard_active(input: &DiscardInput) -> discard::ActiveModel {
    discard::ActiveModel {
        cultivar_id: Set(input.cultivar_id),
        quantity: Set(input.quantity),
        reason: Set(input.reason.clone()),
        discard_date: Set(input.discard_date),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

async fn apply_buy<C: ConnectionTrait>(
    db: &C,
    buy: &buy::Model,
) -> Result<Vec<Event>, ServiceError> {
    let events = apply(db, buy.tenant_id, buy, "seed purchase").await?;
    open_payable(
        db,
        buy.tenant_id,
        PayableOrigin::Buy(buy.id),
        Some(buy.supplier_id),
        buy_description(buy),
        buy.total_value,
        Settlement {
            payment: buy.payment,
            due_date: buy.due_date,
        },
    )
    .await?;
    Ok(events)
}

async fn revert_buy<C: ConnectionTrait>(
    db: &C,
    buy: &buy::Model,
) -> Result<Vec<Event>, ServiceError> {
    close_payable(db, buy.tenant_id, PayableOrigin::Buy(buy.id), "seed purchase").await?;
    revert(db, buy.tenant_id, buy, "seed purchase reverted").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn planting_input() -> PlantingInput {
        PlantingInput {
            cultivar_id: Uuid::new_v4(),
            plot_id: Uuid::new_v4(),
            season: "2024/25".to_string(),
            quantity: dec!(1200),
            area_ha: Some(dec!(20)),
            planting_date: NaiveDate::from_ymd_opt(2024, 10, 20).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn plantings_and_discards_withdraw_stock() {
        let planting = planting::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            cultivar_id: Uuid::new_v4(),
            plot_id: Uuid::new_v4(),
            season: "2024/25".to_string(),
            quantity: dec!(300),
            area_ha: None,
            planting_date: NaiveDate::from_ymd_opt(2024, 10, 20).unwrap(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(planting.stock_delta(), dec!(-300));

        let harvest = harvest::Model {
            id: Uuid::new_v4(),
            tenant_id: planting.tenant_id,
            cultivar_id: planting.cultivar_id,
            plot_id: planting.plot_id,
            season: "2024/25".to_string(),
            quantity: dec!(5400),
            harvest_date: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(harvest.stock_delta(), dec!(5400));
    }

    #[test]
    fn planting_area_must_be_positive() {
        let mut input = planting_input();
        input.area_ha = Some(dec!(0));
        assert_matches!(check_planting(&input), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn planting_needs_a_season() {
        let mut input = planting_input();
        input.season = String::new();
        assert_matches!(check_planting(&input), Err(ServiceError::ValidationError(_)));
    }
}
