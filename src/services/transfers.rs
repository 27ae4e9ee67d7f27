//! Input transfers between two farms of the tenant.

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
    models::{farm, product, transfer},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::{adjust_product_stock, ensure_positive, input_stock_event},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferInput {
    pub product_id: Uuid,
    pub origin_farm_id: Uuid,
    pub destination_farm_id: Uuid,
    pub quantity: Decimal,
    pub transfer_date: NaiveDate,
    pub notes: Option<String>,
}

impl TransferInput {
    fn check(&self) -> Result<(), ServiceError> {
        ensure_positive("quantity", self.quantity)?;
        if self.origin_farm_id == self.destination_farm_id {
            return Err(ServiceError::ValidationError(
                "origin and destination farms must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TransferFilter {
    pub product_id: Option<Uuid>,
    /// Matches either end of the transfer.
    pub farm_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct TransferService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl TransferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: TransferFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<transfer::Model>, ServiceError> {
        use transfer::Column;

        let mut query = transfer::Entity::find_in_tenant(tenant_id);
        if let Some(product_id) = filter.product_id {
            query = query.filter(Column::ProductId.eq(product_id));
        }
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(
                Column::OriginFarmId
                    .eq(farm_id)
                    .or(Column::DestinationFarmId.eq(farm_id)),
            );
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::TransferDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<transfer::Model, ServiceError> {
        find_owned::<transfer::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: TransferInput,
    ) -> Result<transfer::Model, ServiceError> {
        input.check()?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (transfer::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    check_references(txn, tenant_id, &input).await?;
                    let now = Utc::now();
                    let created = transfer::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..active_from(&input)
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = shift(txn, &created, Decimal::ONE).await?;
                    Ok((created, events))
                })
            })
            .await?;

        info!(transfer_id = %created.id, quantity = %created.quantity, "input transfer recorded");
        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: TransferInput,
    ) -> Result<transfer::Model, ServiceError> {
        input.check()?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (transfer::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<transfer::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = shift(txn, &existing, Decimal::NEGATIVE_ONE).await?;

                    check_references(txn, tenant_id, &input).await?;
                    let mut active = active_from(&input);
                    active.id = ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(shift(txn, &updated, Decimal::ONE).await?);
                    Ok((updated, events))
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        Ok(updated)
    }

    /// Reverses the transfer; the destination must still hold the quantity.
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<transfer::Entity, _>(txn, tenant_id, id).await?;
                    let events = shift(txn, &existing, Decimal::NEGATIVE_ONE).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        info!(transfer_id = %id, "input transfer reversed");
        Ok(())
    }
}

fn active_from(input: &TransferInput) -> transfer::ActiveModel {
    transfer::ActiveModel {
        product_id: Set(input.product_id),
        origin_farm_id: Set(input.origin_farm_id),
        destination_farm_id: Set(input.destination_farm_id),
        quantity: Set(input.quantity),
        transfer_date: Set(input.transfer_date),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    input: &TransferInput,
) -> Result<(), ServiceError> {
    find_referenced::<product::Entity, _>(db, tenant_id, input.product_id).await?;
    find_referenced::<farm::Entity, _>(db, tenant_id, input.origin_farm_id).await?;
    find_referenced::<farm::Entity, _>(db, tenant_id, input.destination_farm_id).await?;
    Ok(())
}

/// Moves the transferred quantity from origin to destination (`direction` 1)
/// or back (`direction` -1). The side losing stock is debited first.
async fn shift<C: ConnectionTrait>(
    db: &C,
    transfer: &transfer::Model,
    direction: Decimal,
) -> Result<Vec<Event>, ServiceError> {
    let amount = transfer.quantity * direction;
    let (debited, credited) = if direction.is_sign_positive() {
        (transfer.origin_farm_id, transfer.destination_farm_id)
    } else {
        (transfer.destination_farm_id, transfer.origin_farm_id)
    };
    let reason = if direction.is_sign_positive() {
        "transfer"
    } else {
        "transfer reverted"
    };

    let out = adjust_product_stock(
        db,
        transfer.tenant_id,
        transfer.product_id,
        debited,
        -amount.abs(),
    )
    .await?;
    let into = adjust_product_stock(
        db,
        transfer.tenant_id,
        transfer.product_id,
        credited,
        amount.abs(),
    )
    .await?;
    Ok(vec![
        input_stock_event(&out, reason),
        input_stock_event(&into, reason),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn transfer_to_the_same_farm_is_rejected() {
        let farm_id = Uuid::new_v4();
        let input = TransferInput {
            product_id: Uuid::new_v4(),
            origin_farm_id: farm_id,
            destination_farm_id: farm_id,
            quantity: dec!(10),
            transfer_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            notes: None,
        };
        assert_matches!(input.check(), Err(ServiceError::ValidationError(_)));
    }
}
