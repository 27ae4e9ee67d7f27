//! Fuel tanks and machine refuels.
//!
//! A refuel draws from a tank and advances the machine's hour meter. Deleting
//! it returns the fuel, and rolls the meter back to the highest reading still
//! on record when it was the current one.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, ModelTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
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
    models::{farm, fuel_tank, machine, refuel},
    repositories::{count_where, find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::{adjust_tank_stock, ensure_not_negative, ensure_positive},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FuelTankInput {
    pub farm_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub capacity_liters: Decimal,
    /// Opening level. Only accepted on creation; afterwards use supply.
    pub stock_liters: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplyInput {
    pub liters: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefuelInput {
    pub machine_id: Uuid,
    pub tank_id: Uuid,
    pub liters: Decimal,
    pub hour_meter: Decimal,
    pub refuel_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FuelTankFilter {
    pub farm_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RefuelFilter {
    pub machine_id: Option<Uuid>,
    pub tank_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Rejects a meter reading below the machine's current one.
pub fn ensure_meter_advances(current: Decimal, reading: Decimal) -> Result<(), ServiceError> {
    if reading < current {
        return Err(ServiceError::ValidationError(format!(
            "hour meter {} is below the machine's current reading {}",
            reading, current
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct FuelService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FuelService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn list_tanks(
        &self,
        tenant_id: Uuid,
        filter: FuelTankFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<fuel_tank::Model>, ServiceError> {
        let mut query = fuel_tank::Entity::find_in_tenant(tenant_id);
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(fuel_tank::Column::FarmId.eq(farm_id));
        }
        paginate(
            &*self.db_pool,
            query.order_by_asc(fuel_tank::Column::Name),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_tank(&self, tenant_id: Uuid, id: Uuid) -> Result<fuel_tank::Model, ServiceError> {
        find_owned::<fuel_tank::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_tank(
        &self,
        tenant_id: Uuid,
        input: FuelTankInput,
    ) -> Result<fuel_tank::Model, ServiceError> {
        input.validate()?;
        ensure_positive("capacity_liters", input.capacity_liters)?;
        let stock = input.stock_liters.unwrap_or(Decimal::ZERO);
        ensure_not_negative("stock_liters", stock)?;
        if stock > input.capacity_liters {
            return Err(ServiceError::ValidationError(format!(
                "stock_liters {} exceeds capacity {}",
                stock, input.capacity_liters
            )));
        }
        let db = &*self.db_pool;
        find_referenced::<farm::Entity, _>(db, tenant_id, input.farm_id).await?;

        let now = Utc::now();
        let created = fuel_tank::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            farm_id: Set(input.farm_id),
            name: Set(input.name.trim().to_string()),
            capacity_liters: Set(input.capacity_liters),
            stock_liters: Set(stock),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(tank_id = %created.id, "fuel tank created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_tank(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: FuelTankInput,
    ) -> Result<fuel_tank::Model, ServiceError> {
        input.validate()?;
        if input.stock_liters.is_some() {
            return Err(ServiceError::ValidationError(
                "stock_liters cannot be edited; supply the tank or record a refuel".to_string(),
            ));
        }
        ensure_positive("capacity_liters", input.capacity_liters)?;
        let db = &*self.db_pool;
        let existing = find_owned::<fuel_tank::Entity, _>(db, tenant_id, id).await?;
        if input.capacity_liters < existing.stock_liters {
            return Err(ServiceError::Conflict(format!(
                "tank {} holds {} liters, more than the new capacity",
                existing.name, existing.stock_liters
            )));
        }
        find_referenced::<farm::Entity, _>(db, tenant_id, input.farm_id).await?;

        let mut active: fuel_tank::ActiveModel = existing.into();
        active.farm_id = Set(input.farm_id);
        active.name = Set(input.name.trim().to_string());
        active.capacity_liters = Set(input.capacity_liters);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_tank(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = find_owned::<fuel_tank::Entity, _>(db, tenant_id, id).await?;
        if count_where::<refuel::Entity, _, _>(db, tenant_id, refuel::Column::TankId, id).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "fuel tank {} has refuels",
                existing.name
            )));
        }
        existing.delete(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    /// Adds fuel to a tank, never above its capacity.
    #[instrument(skip(self))]
    pub async fn supply(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: SupplyInput,
    ) -> Result<fuel_tank::Model, ServiceError> {
        ensure_positive("liters", input.liters)?;
        let db = &*self.db_pool;
        find_owned::<fuel_tank::Entity, _>(db, tenant_id, id).await?;

        let tank = self
            .db_pool
            .transaction::<_, fuel_tank::Model, ServiceError>(|txn| {
                Box::pin(async move { adjust_tank_stock(txn, tenant_id, id, input.liters).await })
            })
            .await?;

        info!(tank_id = %id, liters = %input.liters, stock = %tank.stock_liters, "fuel tank supplied");
        self.event_sender
            .send_or_log(Event::FuelSupplied {
                tenant_id,
                tank_id: id,
                liters: input.liters,
                stock_liters: tank.stock_liters,
            })
            .await;
        Ok(tank)
    }

    // Refuels

    pub async fn list_refuels(
        &self,
        tenant_id: Uuid,
        filter: RefuelFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<refuel::Model>, ServiceError> {
        use refuel::Column;

        let mut query = refuel::Entity::find_in_tenant(tenant_id);
        if let Some(machine_id) = filter.machine_id {
            query = query.filter(Column::MachineId.eq(machine_id));
        }
        if let Some(tank_id) = filter.tank_id {
            query = query.filter(Column::TankId.eq(tank_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::RefuelDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::RefuelDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::RefuelDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_refuel(&self, tenant_id: Uuid, id: Uuid) -> Result<refuel::Model, ServiceError> {
        find_owned::<refuel::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(machine_id = %input.machine_id))]
    pub async fn create_refuel(
        &self,
        tenant_id: Uuid,
        input: RefuelInput,
    ) -> Result<refuel::Model, ServiceError> {
        ensure_positive("liters", input.liters)?;
        ensure_not_negative("hour_meter", input.hour_meter)?;

        let created = self
            .db_pool
            .transaction::<_, refuel::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let mut active = refuel::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..refuel_active(&input)
                    };
                    active.previous_hour_meter =
                        Set(apply_refuel(txn, tenant_id, &input).await?);
                    active.insert(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await?;

        info!(refuel_id = %created.id, liters = %created.liters, "refuel recorded");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_refuel(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: RefuelInput,
    ) -> Result<refuel::Model, ServiceError> {
        ensure_positive("liters", input.liters)?;
        ensure_not_negative("hour_meter", input.hour_meter)?;

        self.db_pool
            .transaction::<_, refuel::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<refuel::Entity, _>(txn, tenant_id, id).await?;
                    let machine =
                        find_owned::<machine::Entity, _>(txn, tenant_id, existing.machine_id)
                            .await?;

                    let previous = if input.machine_id == existing.machine_id
                        && machine.hour_meter != existing.hour_meter
                    {
                        amend_past_refuel(txn, &existing, &machine, &input).await?
                    } else {
                        revert_refuel(txn, &existing).await?;
                        apply_refuel(txn, tenant_id, &input).await?
                    };

                    let mut active = refuel_active(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    active.previous_hour_meter = Set(previous);
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete_refuel(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<refuel::Entity, _>(txn, tenant_id, id).await?;
                    revert_refuel(txn, &existing).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(refuel_id = %id, "refuel deleted");
        Ok(())
    }
}

fn refuel_active(input: &RefuelInput) -> refuel::ActiveModel {
    refuel::ActiveModel {
        machine_id: Set(input.machine_id),
        tank_id: Set(input.tank_id),
        liters: Set(input.liters),
        hour_meter: Set(input.hour_meter),
        refuel_date: Set(input.refuel_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Draws the fuel and advances the machine's meter. Returns the reading the
/// machine had before.
async fn apply_refuel<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    input: &RefuelInput,
) -> Result<Decimal, ServiceError> {
    let machine = find_referenced::<machine::Entity, _>(db, tenant_id, input.machine_id).await?;
    ensure_meter_advances(machine.hour_meter, input.hour_meter)?;
    adjust_tank_stock(db, tenant_id, input.tank_id, -input.liters).await?;

    let previous = machine.hour_meter;
    let mut active: machine::ActiveModel = machine.into();
    active.hour_meter = Set(input.hour_meter);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(ServiceError::db_error)?;
    Ok(previous)
}

async fn revert_refuel<C: ConnectionTrait>(
    db: &C,
    refuel: &refuel::Model,
) -> Result<(), ServiceError> {
    adjust_tank_stock(db, refuel.tenant_id, refuel.tank_id, refuel.liters).await?;

    let machine = find_owned::<machine::Entity, _>(db, refuel.tenant_id, refuel.machine_id).await?;
    if machine.hour_meter == refuel.hour_meter {
        // Other refuels may share the reading
        let latest_other = other_refuels(refuel)
            .order_by_desc(refuel::Column::HourMeter)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .map(|other| other.hour_meter);
        let restored = latest_other.map_or(refuel.previous_hour_meter, |reading| {
            reading.max(refuel.previous_hour_meter)
        });

        let mut active: machine::ActiveModel = machine.into();
        active.hour_meter = Set(restored);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)?;
    }
    Ok(())
}

/// Edits a refuel that is no longer the machine's current reading. The new
/// reading must sit between the one before it and the next recorded one; the
/// machine's meter is left alone.
async fn amend_past_refuel<C: ConnectionTrait>(
    db: &C,
    existing: &refuel::Model,
    machine: &machine::Model,
    input: &RefuelInput,
) -> Result<Decimal, ServiceError> {
    ensure_meter_advances(existing.previous_hour_meter, input.hour_meter)?;

    let next = other_refuels(existing)
        .filter(refuel::Column::HourMeter.gte(existing.hour_meter))
        .order_by_asc(refuel::Column::HourMeter)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;
    let ceiling = next
        .as_ref()
        .map_or(machine.hour_meter, |next| next.hour_meter);
    if input.hour_meter > ceiling {
        return Err(ServiceError::ValidationError(format!(
            "hour meter {} is past the next recorded reading {}",
            input.hour_meter, ceiling
        )));
    }

    adjust_tank_stock(db, existing.tenant_id, existing.tank_id, existing.liters).await?;
    adjust_tank_stock(db, existing.tenant_id, input.tank_id, -input.liters).await?;

    if let Some(next) = next {
        if next.previous_hour_meter == existing.hour_meter {
            let mut active: refuel::ActiveModel = next.into();
            active.previous_hour_meter = Set(input.hour_meter);
            active.updated_at = Set(Utc::now());
            active.update(db).await.map_err(ServiceError::db_error)?;
        }
    }
    Ok(existing.previous_hour_meter)
}

/// Refuels of the same machine, excluding `refuel` itself.
fn other_refuels(refuel: &refuel::Model) -> Select<refuel::Entity> {
    refuel::Entity::find_in_tenant(refuel.tenant_id)
        .filter(refuel::Column::MachineId.eq(refuel.machine_id))
        .filter(refuel::Column::Id.ne(refuel.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn meter_may_stay_but_not_go_back() {
        assert!(ensure_meter_advances(dec!(1520.5), dec!(1520.5)).is_ok());
        assert!(ensure_meter_advances(dec!(1520.5), dec!(1531)).is_ok());
        assert_matches!(
            ensure_meter_advances(dec!(1520.5), dec!(1519)),
            Err(ServiceError::ValidationError(_))
        );
    }
}
