//! Seed sales: sale exits (optionally delivered against a sale contract) and
//! industry sales.
//!
//! A sale withdraws cultivar stock and, on term, opens a receivable. Once that
//! receivable is paid the sale is frozen: update and delete answer 409.
//! Updates revert the stored sale and apply the new one in the same transaction.

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
    models::{customer, industry_sale, sale_exit, PaymentTerm},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::{
        finance::{close_receivable, open_receivable, ReceivableOrigin, Settlement},
        sale_contracts,
        stock::{
            adjust_cultivar_stock, cultivar_stock_events, ensure_not_negative, ensure_positive,
            line_total,
        },
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleExitInput {
    pub cultivar_id: Uuid,
    pub customer_id: Uuid,
    pub contract_item_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sale_date: NaiveDate,
    #[validate(length(max = 64))]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl SaleExitInput {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        ensure_positive("quantity", self.quantity)?;
        ensure_not_negative("unit_price", self.unit_price)?;
        Settlement {
            payment: self.payment,
            due_date: self.due_date,
        }
        .validate()
    }

    fn active(&self) -> Result<sale_exit::ActiveModel, ServiceError> {
        Ok(sale_exit::ActiveModel {
            cultivar_id: Set(self.cultivar_id),
            customer_id: Set(self.customer_id),
            contract_item_id: Set(self.contract_item_id),
            quantity: Set(self.quantity),
            unit_price: Set(self.unit_price),
            total_value: Set(line_total(self.quantity, self.unit_price, Decimal::ZERO)?),
            sale_date: Set(self.sale_date),
            invoice_number: Set(self.invoice_number.clone()),
            payment: Set(self.payment),
            due_date: Set(self.due_date),
            notes: Set(self.notes.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct IndustrySaleInput {
    pub cultivar_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Percentage taken off the gross value, `0..=100`.
    #[serde(default)]
    pub discount_percent: Decimal,
    pub sale_date: NaiveDate,
    #[validate(length(max = 64))]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl IndustrySaleInput {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        ensure_positive("quantity", self.quantity)?;
        ensure_not_negative("unit_price", self.unit_price)?;
        ensure_not_negative("discount_percent", self.discount_percent)?;
        if self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "discount_percent cannot exceed 100".to_string(),
            ));
        }
        Settlement {
            payment: self.payment,
            due_date: self.due_date,
        }
        .validate()
    }

    fn active(&self) -> Result<industry_sale::ActiveModel, ServiceError> {
        Ok(industry_sale::ActiveModel {
            cultivar_id: Set(self.cultivar_id),
            customer_id: Set(self.customer_id),
            quantity: Set(self.quantity),
            unit_price: Set(self.unit_price),
            discount_percent: Set(self.discount_percent),
            total_value: Set(line_total(
                self.quantity,
                self.unit_price,
                self.discount_percent,
            )?),
            sale_date: Set(self.sale_date),
            invoice_number: Set(self.invoice_number.clone()),
            payment: Set(self.payment),
            due_date: Set(self.due_date),
            notes: Set(self.notes.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SaleFilter {
    pub cultivar_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct SaleService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SaleService {
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

    #[instrument(skip(self))]
    pub async fn list_exits(
        &self,
        tenant_id: Uuid,
        filter: SaleFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<sale_exit::Model>, ServiceError> {
        use sale_exit::Column;

        let mut query = sale_exit::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(Column::CustomerId.eq(customer_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::SaleDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::SaleDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::SaleDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_exit(&self, tenant_id: Uuid, id: Uuid) -> Result<sale_exit::Model, ServiceError> {
        find_owned::<sale_exit::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(cultivar_id = %input.cultivar_id))]
    pub async fn create_exit(
        &self,
        tenant_id: Uuid,
        input: SaleExitInput,
    ) -> Result<sale_exit::Model, ServiceError> {
        input.check()?;

        let (sale, events) = self
            .db_pool
            .transaction::<_, (sale_exit::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.customer_id)
                        .await?;
                    let now = Utc::now();
                    let sale = sale_exit::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..input.active()?
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply_exit(txn, &sale).await?;
                    Ok((sale, events))
                })
            })
            .await?;

        metrics::counter!("agro_erp.sales.recorded", 1);
        info!(sale_id = %sale.id, quantity = %sale.quantity, total = %sale.total_value, "seed sale recorded");
        self.publish(events).await;
        Ok(sale)
    }

    #[instrument(skip(self, input))]
    pub async fn update_exit(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: SaleExitInput,
    ) -> Result<sale_exit::Model, ServiceError> {
        input.check()?;

        let (sale, events) = self
            .db_pool
            .transaction::<_, (sale_exit::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<sale_exit::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert_exit(txn, &existing).await?;

                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.customer_id)
                        .await?;
                    let mut active = input.active()?;
                    active.id = ActiveValue::Unchanged(existing.id);
                    let sale = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply_exit(txn, &sale).await?);
                    Ok((sale, events))
                })
            })
            .await?;

        info!(sale_id = %sale.id, "seed sale updated");
        self.publish(events).await;
        Ok(sale)
    }

    #[instrument(skip(self))]
    pub async fn delete_exit(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<sale_exit::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert_exit(txn, &existing).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    events.push(Event::SaleReverted {
                        tenant_id,
                        sale_id: id,
                    });
                    Ok(events)
                })
            })
            .await?;

        info!(sale_id = %id, "seed sale deleted");
        self.publish(events).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_industry(
        &self,
        tenant_id: Uuid,
        filter: SaleFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<industry_sale::Model>, ServiceError> {
        use industry_sale::Column;

        let mut query = industry_sale::Entity::find_in_tenant(tenant_id);
        if let Some(cultivar_id) = filter.cultivar_id {
            query = query.filter(Column::CultivarId.eq(cultivar_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(Column::CustomerId.eq(customer_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::SaleDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::SaleDate.lte(to));
        }
        paginate(
            &*self.db_pool,
            query.order_by_desc(Column::SaleDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_industry(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<industry_sale::Model, ServiceError> {
        find_owned::<industry_sale::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(cultivar_id = %input.cultivar_id))]
    pub async fn create_industry(
        &self,
        tenant_id: Uuid,
        input: IndustrySaleInput,
    ) -> Result<industry_sale::Model, ServiceError> {
        input.check()?;

        let (sale, events) = self
            .db_pool
            .transaction::<_, (industry_sale::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.customer_id)
                        .await?;
                    let now = Utc::now();
                    let sale = industry_sale::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        created_at: Set(now),
                        ..input.active()?
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let events = apply_industry(txn, &sale).await?;
                    Ok((sale, events))
                })
            })
            .await?;

        metrics::counter!("agro_erp.sales.recorded", 1);
        info!(sale_id = %sale.id, total = %sale.total_value, "industry sale recorded");
        self.publish(events).await;
        Ok(sale)
    }

    #[instrument(skip(self, input))]
    pub async fn update_industry(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: IndustrySaleInput,
    ) -> Result<industry_sale::Model, ServiceError> {
        input.check()?;

        let (sale, events) = self
            .db_pool
            .transaction::<_, (industry_sale::Model, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<industry_sale::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert_industry(txn, &existing).await?;

                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.customer_id)
                        .await?;
                    let mut active = input.active()?;
                    active.id = ActiveValue::Unchanged(existing.id);
                    let sale = active.update(txn).await.map_err(ServiceError::db_error)?;

                    events.extend(apply_industry(txn, &sale).await?);
                    Ok((sale, events))
                })
            })
            .await?;

        self.publish(events).await;
        Ok(sale)
    }

    #[instrument(skip(self))]
    pub async fn delete_industry(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let events = self
            .db_pool
            .transaction::<_, Vec<Event>, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing =
                        find_owned::<industry_sale::Entity, _>(txn, tenant_id, id).await?;
                    let mut events = revert_industry(txn, &existing).await?;
                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    events.push(Event::SaleReverted {
                        tenant_id,
                        sale_id: id,
                    });
                    Ok(events)
                })
            })
            .await?;

        info!(sale_id = %id, "industry sale deleted");
        self.publish(events).await;
        Ok(())
    }
}

fn sale_description(kind: &str, invoice: &Option<String>, date: NaiveDate) -> String {
    match invoice {
        Some(invoice) => format!("{}, invoice {}", kind, invoice),
        None => format!("{} of {}", kind, date),
    }
}

async fn apply_exit<C: ConnectionTrait>(
    db: &C,
    sale: &sale_exit::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = sale.tenant_id;
    let (cultivar, before) =
        adjust_cultivar_stock(db, tenant_id, sale.cultivar_id, -sale.quantity).await?;
    let mut events = cultivar_stock_events(&cultivar, before, "seed sale");

    if let Some(item_id) = sale.contract_item_id {
        events.extend(
            sale_contracts::deliver(
                db,
                tenant_id,
                item_id,
                sale.customer_id,
                sale.cultivar_id,
                sale.quantity,
            )
            .await?,
        );
    }

    open_receivable(
        db,
        tenant_id,
        ReceivableOrigin::SaleExit(sale.id),
        sale.customer_id,
        sale_description("Seed sale", &sale.invoice_number, sale.sale_date),
        sale.total_value,
        Settlement {
            payment: sale.payment,
            due_date: sale.due_date,
        },
    )
    .await?;

    events.push(Event::SaleRecorded {
        tenant_id,
        sale_id: sale.id,
        quantity: sale.quantity,
        total_value: sale.total_value,
    });
    Ok(events)
}

async fn revert_exit<C: ConnectionTrait>(
    db: &C,
    sale: &sale_exit::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = sale.tenant_id;
    close_receivable(db, tenant_id, ReceivableOrigin::SaleExit(sale.id), "sale").await?;

    let (cultivar, before) =
        adjust_cultivar_stock(db, tenant_id, sale.cultivar_id, sale.quantity).await?;
    let mut events = cultivar_stock_events(&cultivar, before, "seed sale reverted");

    if let Some(item_id) = sale.contract_item_id {
        events.extend(sale_contracts::undeliver(db, tenant_id, item_id, sale.quantity).await?);
    }
    Ok(events)
}

async fn apply_industry<C: ConnectionTrait>(
    db: &C,
    sale: &industry_sale::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = sale.tenant_id;
    let (cultivar, before) =
        adjust_cultivar_stock(db, tenant_id, sale.cultivar_id, -sale.quantity).await?;
    let mut events = cultivar_stock_events(&cultivar, before, "industry sale");

    open_receivable(
        db,
        tenant_id,
        ReceivableOrigin::IndustrySale(sale.id),
        sale.customer_id,
        sale_description("Industry sale", &sale.invoice_number, sale.sale_date),
        sale.total_value,
        Settlement {
            payment: sale.payment,
            due_date: sale.due_date,
        },
    )
    .await?;

    events.push(Event::SaleRecorded {
        tenant_id,
        sale_id: sale.id,
        quantity: sale.quantity,
        total_value: sale.total_value,
    });
    Ok(events)
}

async fn revert_industry<C: ConnectionTrait>(
    db: &C,
    sale: &industry_sale::Model,
) -> Result<Vec<Event>, ServiceError> {
    let tenant_id = sale.tenant_id;
    close_receivable(
        db,
        tenant_id,
        ReceivableOrigin::IndustrySale(sale.id),
        "industry sale",
    )
    .await?;

    let (cultivar, before) =
        adjust_cultivar_stock(db, tenant_id, sale.cultivar_id, sale.quantity).await?;
    Ok(cultivar_stock_events(&cultivar, before, "industry sale reverted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn industry_input() -> IndustrySaleInput {
        IndustrySaleInput {
            cultivar_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            quantity: dec!(10000),
            unit_price: dec!(1.80),
            discount_percent: dec!(5),
            sale_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            invoice_number: None,
            payment: PaymentTerm::Cash,
            due_date: None,
            notes: None,
        }
    }

    #[test]
    fn industry_total_applies_the_discount() {
        let active = industry_input().active().unwrap();
        assert_eq!(active.total_value.unwrap(), dec!(17100.00));
    }

    #[test]
    fn discount_above_one_hundred_percent_is_rejected() {
        let mut input = industry_input();
        input.discount_percent = dec!(100.01);
        assert_matches!(input.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn term_sale_without_due_date_is_rejected() {
        let input = SaleExitInput {
            cultivar_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            contract_item_id: None,
            quantity: dec!(40),
            unit_price: dec!(250),
            sale_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            invoice_number: Some("NF-77".to_string()),
            payment: PaymentTerm::Term,
            due_date: None,
            notes: None,
        };
        assert_matches!(input.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn description_prefers_the_invoice() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(
            sale_description("Seed sale", &Some("NF-77".to_string()), date),
            "Seed sale, invoice NF-77"
        );
        assert_eq!(
            sale_description("Seed sale", &None, date),
            "Seed sale of 2025-01-15"
        );
    }
}
