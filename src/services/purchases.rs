//! Input purchases. A purchase adds to the farm's input stock, may receive
//! against a purchase order item and, on term, opens a payable.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
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
    models::{customer, farm, product, purchase, PaymentTerm},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::{
        finance::{close_payable, open_payable, PayableOrigin, Settlement},
        purchase_orders,
        stock::{
            adjust_product_stock, ensure_not_negative, ensure_positive, input_stock_event,
            line_total,
        },
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseInput {
    pub product_id: Uuid,
    pub farm_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchase_date: NaiveDate,
    #[validate(length(max = 64))]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
    pub purchase_order_item_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl PurchaseInput {
    fn settlement(&self) -> Settlement {
        Settlement {
            payment: self.payment,
            due_date: self.due_date,
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        ensure_positive("quantity", self.quantity)?;
        ensure_not_negative("unit_price", self.unit_price)?;
        self.settlement().validate()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PurchaseFilter {
    pub product_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PurchaseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: PurchaseFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<purchase::Model>, ServiceError> {
        use purchase::Column;

        let mut query = purchase::Entity::find_in_tenant(tenant_id);
        if let Some(product_id) = filter.product_id {
            query = query.filter(Column::ProductId.eq(product_id));
        }
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(Column::FarmId.eq(farm_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::PurchaseDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::PurchaseDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::PurchaseDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<purchase::Model, ServiceError> {
        find_owned::<purchase::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: PurchaseInput,
    ) -> Result<purchase::Model, ServiceError> {
        input.check()?;

        let (created, events) = self
            .db_pool
            .transaction::<_, (purchase::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    check_references(txn, tenant_id, &input).await?;
                    let now = Utc::now();
                    let created = purchase::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..active_from(&input)?
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply(txn, &created).await?;
                    Ok((created, events))
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        info!(purchase_id = %created.id, total = %created.total_value, "input purchase recorded");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PurchaseInput,
    ) -> Result<purchase::Model, ServiceError> {
        input.check()?;

        let (updated, events) = self
            .db_pool
            .transaction::<_, (purchase::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<purchase::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert(txn, &existing).await?;

                    check_references(txn, tenant_id, &input).await?;
                    let mut active = active_from(&input)?;
                    active.id = sea_orm::ActiveValue::Unchanged(existing.id);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply(txn, &updated).await?);
                    Ok((updated, events))
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<purchase::Entity, _>(txn, tenant_id, id).await?;
                    let events = revert(txn, &existing).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(events)
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        info!(purchase_id = %id, "input purchase deleted");
        Ok(())
    }
}

/// Active model carrying every input-derived column.
fn active_from(input: &PurchaseInput) -> Result<purchase::ActiveModel, ServiceError> {
    Ok(purchase::ActiveModel {
        product_id: Set(input.product_id),
        farm_id: Set(input.farm_id),
        supplier_id: Set(input.supplier_id),
        quantity: Set(input.quantity),
        unit_price: Set(input.unit_price),
        total_value: Set(line_total(input.quantity, input.unit_price, Decimal::ZERO)?),
        purchase_date: Set(input.purchase_date),
        invoice_number: Set(input.invoice_number.clone()),
        payment: Set(input.payment),
        due_date: Set(input.due_date),
        purchase_order_item_id: Set(input.purchase_order_item_id),
        notes: Set(input.notes.clone()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    })
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    input: &PurchaseInput,
) -> Result<(), ServiceError> {
    find_referenced::<product::Entity, _>(db, tenant_id, input.product_id).await?;
    find_referenced::<farm::Entity, _>(db, tenant_id, input.farm_id).await?;
    find_referenced::<customer::Entity, _>(db, tenant_id, input.supplier_id).await?;
    Ok(())
}

fn description(purchase: &purchase::Model) -> String {
    match &purchase.invoice_number {
        Some(invoice) => format!("Input purchase, invoice {}", invoice),
        None => format!("Input purchase of {}", purchase.purchase_date),
    }
}

async fn apply<C: ConnectionTrait>(
    db: &C,
    purchase: &purchase::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = purchase.tenant_id;
    let balance = adjust_product_stock(
        db,
        tenant_id,
        purchase.product_id,
        purchase.farm_id,
        purchase.quantity,
    )
    .await?;
    let mut events = vec![input_stock_event(&balance, "purchase")];

    if let Some(item_id) = purchase.purchase_order_item_id {
        events.extend(
            purchase_orders::receive(
                db,
                tenant_id,
                item_id,
                purchase.supplier_id,
                purchase.product_id,
                purchase.quantity,
            )
            .await?,
        );
    }

    open_payable(
        db,
        tenant_id,
        PayableOrigin::Purchase(purchase.id),
        Some(purchase.supplier_id),
        description(purchase),
        purchase.total_value,
        Settlement {
            payment: purchase.payment,
            due_date: purchase.due_date,
        },
    )
    .await?;
    Ok(events)
}

/// Undoes the effects of a stored purchase. Fails when its payable is paid or
/// when the farm stock no longer holds the purchased quantity.
async fn revert<C: ConnectionTrait>(
    db: &C,
    purchase: &purchase::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = purchase.tenant_id;
    close_payable(
        db,
        tenant_id,
        PayableOrigin::Purchase(purchase.id),
        "input purchase",
    )
    .await?;

    let balance = adjust_product_stock(
        db,
        tenant_id,
        purchase.product_id,
        purchase.farm_id,
        -purchase.quantity,
    )
    .await?;

    if let Some(item_id) = purchase.purchase_order_item_id {
        purchase_orders::unreceive(db, tenant_id, item_id, purchase.quantity).await?;
    }
    Ok(vec![input_stock_event(&balance, "purchase reverted")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn input() -> PurchaseInput {
        PurchaseInput {
            product_id: Uuid::new_v4(),
            farm_id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            quantity: dec!(200),
            unit_price: dec!(3.75),
            purchase_date: NaiveDate::from_ymd_opt(2024, 8, 10).unwrap(),
            invoice_number: Some("NF-1020".to_string()),
            payment: PaymentTerm::Cash,
            due_date: None,
            purchase_order_item_id: None,
            notes: None,
        }
    }

    #[test]
    fn term_purchase_requires_due_date() {
        let mut purchase = input();
        purchase.payment = PaymentTerm::Term;
        assert_matches!(purchase.check(), Err(ServiceError::ValidationError(_)));

        purchase.due_date = NaiveDate::from_ymd_opt(2024, 9, 10);
        assert!(purchase.check().is_ok());
    }

    #[test]
    fn total_value_is_derived_from_quantity_and_price() {
        let active = active_from(&input()).unwrap();
        assert_eq!(active.total_value.unwrap(), dec!(750.00));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut purchase = input();
        purchase.quantity = Decimal::ZERO;
        assert_matches!(purchase.check(), Err(ServiceError::ValidationError(_)));
    }
}
