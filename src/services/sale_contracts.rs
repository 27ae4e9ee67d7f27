//! Sale contracts: a customer commits to buy quantities of cultivars, delivered
//! over time through seed sales linked to the contract items.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
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
    events::{Event, EventSender},
    models::{
        cultivar, customer,
        sale_contract::{self, SaleContractStatus},
        sale_contract_item, sale_exit,
    },
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::{ensure_not_negative, ensure_positive, fulfill, item_value, unfulfill},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContractItemInput {
    pub cultivar_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleContractInput {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub contract_number: String,
    pub signed_date: NaiveDate,
    pub delivery_deadline: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<ContractItemInput>,
}

/// Header fields editable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSaleContractInput {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub contract_number: String,
    pub signed_date: NaiveDate,
    pub delivery_deadline: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContractItemUpdate {
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SaleContractFilter {
    pub status: Option<SaleContractStatus>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaleContractItemView {
    #[serde(flatten)]
    pub item: sale_contract_item::Model,
    pub remaining_quantity: Decimal,
    pub total_value: Decimal,
}

/// A contract with its items and delivery progress.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaleContractView {
    #[serde(flatten)]
    pub contract: sale_contract::Model,
    pub items: Vec<SaleContractItemView>,
    pub total_quantity: Decimal,
    pub fulfilled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub total_value: Decimal,
}

impl SaleContractView {
    pub fn new(contract: sale_contract::Model, items: Vec<sale_contract_item::Model>) -> Self {
        let items: Vec<_> = items
            .into_iter()
            .map(|item| SaleContractItemView {
                remaining_quantity: item.quantity - item.fulfilled_quantity,
                total_value: item_value(item.quantity, item.unit_price),
                item,
            })
            .collect();
        let total_quantity = items.iter().map(|i| i.item.quantity).sum();
        let fulfilled_quantity = items.iter().map(|i| i.item.fulfilled_quantity).sum();
        let remaining_quantity = items.iter().map(|i| i.remaining_quantity).sum();
        let total_value = items.iter().map(|i| i.total_value).sum();
        Self {
            contract,
            items,
            total_quantity,
            fulfilled_quantity,
            remaining_quantity,
            total_value,
        }
    }
}

fn validate_item(quantity: Decimal, unit_price: Decimal) -> Result<(), ServiceError> {
    ensure_positive("quantity", quantity)?;
    ensure_not_negative("unit_price", unit_price)
}

#[derive(Clone)]
pub struct SaleContractService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SaleContractService {
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
        filter: SaleContractFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<SaleContractView>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = sale_contract::Entity::find_in_tenant(tenant_id);
        if let Some(status) = filter.status {
            query = query.filter(sale_contract::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(sale_contract::Column::CustomerId.eq(customer_id));
        }
        let contracts = paginate(
            db,
            query.order_by_desc(sale_contract::Column::SignedDate),
            page,
            per_page,
        )
        .await?;

        let ids: Vec<Uuid> = contracts.items.iter().map(|c| c.id).collect();
        let mut items_by_contract: HashMap<Uuid, Vec<sale_contract_item::Model>> = HashMap::new();
        for item in sale_contract_item::Entity::find()
            .filter(sale_contract_item::Column::ContractId.is_in(ids))
            .order_by_asc(sale_contract_item::Column::Position)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
        {
            items_by_contract.entry(item.contract_id).or_default().push(item);
        }

        Ok(contracts.map(|contract| {
            let items = items_by_contract.remove(&contract.id).unwrap_or_default();
            SaleContractView::new(contract, items)
        }))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<SaleContractView, ServiceError> {
        load_view(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(contract_number = %input.contract_number))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SaleContractInput,
    ) -> Result<SaleContractView, ServiceError> {
        input.validate()?;
        for item in &input.items {
            validate_item(item.quantity, item.unit_price)?;
        }

        let contract_id = Uuid::new_v4();
        let view = self
            .db_pool
            .transaction::<_, SaleContractView, ServiceError>(|txn| {
                Box::pin(async move {
                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.customer_id)
                        .await?;
                    ensure_number_free(txn, tenant_id, &input.contract_number, None).await?;

                    let now = Utc::now();
                    let contract = sale_contract::ActiveModel {
                        id: Set(contract_id),
                        tenant_id: Set(tenant_id),
                        customer_id: Set(input.customer_id),
                        contract_number: Set(input.contract_number.trim().to_string()),
                        signed_date: Set(input.signed_date),
                        delivery_deadline: Set(input.delivery_deadline),
                        status: Set(SaleContractStatus::Active),
                        notes: Set(input.notes),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut items = Vec::with_capacity(input.items.len());
                    for (position, item) in (0i32..).zip(input.items) {
                        find_referenced::<cultivar::Entity, _>(txn, tenant_id, item.cultivar_id)
                            .await?;
                        let created = sale_contract_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            tenant_id: Set(tenant_id),
                            contract_id: Set(contract_id),
                            cultivar_id: Set(item.cultivar_id),
                            quantity: Set(item.quantity),
                            fulfilled_quantity: Set(Decimal::ZERO),
                            unit_price: Set(item.unit_price),
                            position: Set(position),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                        items.push(created);
                    }

                    Ok(SaleContractView::new(contract, items))
                })
            })
            .await?;

        info!(contract_id = %view.contract.id, "sale contract created");
        Ok(view)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateSaleContractInput,
    ) -> Result<SaleContractView, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        let view = load_view(db, tenant_id, id).await?;
        if view.contract.status == SaleContractStatus::Cancelled {
            return Err(ServiceError::Conflict(format!(
                "sale contract {} is cancelled",
                view.contract.contract_number
            )));
        }
        if input.customer_id != view.contract.customer_id {
            if view.fulfilled_quantity > Decimal::ZERO {
                return Err(ServiceError::Conflict(
                    "customer cannot change after deliveries were made".to_string(),
                ));
            }
            find_referenced::<customer::Entity, _>(db, tenant_id, input.customer_id).await?;
        }
        ensure_number_free(db, tenant_id, &input.contract_number, Some(id)).await?;

        let mut active: sale_contract::ActiveModel = view.contract.into();
        active.customer_id = Set(input.customer_id);
        active.contract_number = Set(input.contract_number.trim().to_string());
        active.signed_date = Set(input.signed_date);
        active.delivery_deadline = Set(input.delivery_deadline);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        let contract = active.update(db).await.map_err(ServiceError::db_error)?;

        let items = view.items.into_iter().map(|i| i.item).collect();
        Ok(SaleContractView::new(contract, items))
    }

    /// Changes an item's quantity or price. The quantity cannot drop below what
    /// was already delivered; the contract status follows the new totals.
    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        item_id: Uuid,
        input: ContractItemUpdate,
    ) -> Result<SaleContractView, ServiceError> {
        validate_item(input.quantity, input.unit_price)?;

        let (view, events) = self
            .db_pool
            .transaction::<_, (SaleContractView, Vec<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let contract =
                        find_owned::<sale_contract::Entity, _>(txn, tenant_id, id).await?;
                    if contract.status == SaleContractStatus::Cancelled {
                        return Err(ServiceError::Conflict(format!(
                            "sale contract {} is cancelled",
                            contract.contract_number
                        )));
                    }
                    let item =
                        find_owned::<sale_contract_item::Entity, _>(txn, tenant_id, item_id)
                            .await?;
                    if item.contract_id != id {
                        return Err(ServiceError::not_found("Sale contract item", item_id));
                    }
                    if input.quantity < item.fulfilled_quantity {
                        return Err(ServiceError::Conflict(format!(
                            "quantity {} is below the delivered quantity {}",
                            input.quantity, item.fulfilled_quantity
                        )));
                    }

                    let mut active: sale_contract_item::ActiveModel = item.into();
                    active.quantity = Set(input.quantity);
                    active.unit_price = Set(input.unit_price);
                    active.update(txn).await.map_err(ServiceError::db_error)?;

                    let events = sync_status(txn, contract).await?.into_iter().collect();
                    Ok((load_view(txn, tenant_id, id).await?, events))
                })
            })
            .await?;

        for event in events {
            self.event_sender.send_or_log(event).await;
        }
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, tenant_id: Uuid, id: Uuid) -> Result<SaleContractView, ServiceError> {
        let db = &*self.db_pool;
        let view = load_view(db, tenant_id, id).await?;
        if view.contract.status != SaleContractStatus::Active {
            return Err(ServiceError::Conflict(format!(
                "only active contracts can be cancelled; {} is {:?}",
                view.contract.contract_number, view.contract.status
            )));
        }

        let mut active: sale_contract::ActiveModel = view.contract.into();
        active.status = Set(SaleContractStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let contract = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::SaleContractCancelled {
                tenant_id,
                contract_id: id,
            })
            .await;

        let items = view.items.into_iter().map(|i| i.item).collect();
        Ok(SaleContractView::new(contract, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let contract =
                        find_owned::<sale_contract::Entity, _>(txn, tenant_id, id).await?;
                    let items = contract
                        .find_related(sale_contract_item::Entity)
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
                    let deliveries = sale_exit::Entity::find_in_tenant(tenant_id)
                        .filter(sale_exit::Column::ContractItemId.is_in(item_ids))
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if deliveries > 0
                        || items.iter().any(|i| i.fulfilled_quantity > Decimal::ZERO)
                    {
                        return Err(ServiceError::Conflict(format!(
                            "sale contract {} has deliveries",
                            contract.contract_number
                        )));
                    }

                    sale_contract_item::Entity::delete_many()
                        .filter(sale_contract_item::Column::ContractId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    contract.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(contract_id = %id, "sale contract deleted");
        Ok(())
    }
}

async fn load_view<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<SaleContractView, ServiceError> {
    let contract = find_owned::<sale_contract::Entity, _>(db, tenant_id, id).await?;
    let items = contract
        .find_related(sale_contract_item::Entity)
        .order_by_asc(sale_contract_item::Column::Position)
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(SaleContractView::new(contract, items))
}

async fn ensure_number_free<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    number: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = sale_contract::Entity::find_in_tenant(tenant_id)
        .filter(sale_contract::Column::ContractNumber.eq(number.trim()));
    if let Some(id) = except {
        query = query.filter(sale_contract::Column::Id.ne(id));
    }
    let taken = query.count(db).await.map_err(ServiceError::db_error)?;
    if taken > 0 {
        return Err(ServiceError::Conflict(format!(
            "contract number {} is already in use",
            number.trim()
        )));
    }
    Ok(())
}

/// Completes an active contract whose items are all delivered, and reopens a
/// completed one that is no longer fully delivered.
async fn sync_status<C: ConnectionTrait>(
    db: &C,
    contract: sale_contract::Model,
) -> Result<Option<Event>, ServiceError> {
    let items = contract
        .find_related(sale_contract_item::Entity)
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    let complete = !items.is_empty() && items.iter().all(|i| i.fulfilled_quantity >= i.quantity);

    let (next, event) = match (contract.status, complete) {
        (SaleContractStatus::Active, true) => (
            SaleContractStatus::Completed,
            Event::SaleContractCompleted {
                tenant_id: contract.tenant_id,
                contract_id: contract.id,
            },
        ),
        (SaleContractStatus::Completed, false) => (
            SaleContractStatus::Active,
            Event::SaleContractReopened {
                tenant_id: contract.tenant_id,
                contract_id: contract.id,
            },
        ),
        _ => return Ok(None),
    };

    let mut active: sale_contract::ActiveModel = contract.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(ServiceError::db_error)?;
    Ok(Some(event))
}

/// Records a delivery of `quantity` against a contract item. The item must
/// belong to an active contract of `customer_id` and be for `cultivar_id`.
pub(crate) async fn deliver<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
    customer_id: Uuid,
    cultivar_id: Uuid,
    quantity: Decimal,
) -> Result<Option<Event>, ServiceError> {
    let item = find_referenced::<sale_contract_item::Entity, _>(db, tenant_id, item_id).await?;
    let contract = find_owned::<sale_contract::Entity, _>(db, tenant_id, item.contract_id).await?;

    if contract.status != SaleContractStatus::Active {
        return Err(ServiceError::Conflict(format!(
            "sale contract {} is not active",
            contract.contract_number
        )));
    }
    if contract.customer_id != customer_id {
        return Err(ServiceError::ValidationError(format!(
            "sale contract {} belongs to another customer",
            contract.contract_number
        )));
    }
    if item.cultivar_id != cultivar_id {
        return Err(ServiceError::ValidationError(format!(
            "contract item {} is for another cultivar",
            item_id
        )));
    }

    let fulfilled = fulfill(item.quantity, item.fulfilled_quantity, quantity)?;
    let mut active: sale_contract_item::ActiveModel = item.into();
    active.fulfilled_quantity = Set(fulfilled);
    active.update(db).await.map_err(ServiceError::db_error)?;

    sync_status(db, contract).await
}

/// Takes a delivery back, reopening the contract if it had been completed.
pub(crate) async fn undeliver<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
    quantity: Decimal,
) -> Result<Option<Event>, ServiceError> {
    let item = find_owned::<sale_contract_item::Entity, _>(db, tenant_id, item_id).await?;
    let contract = find_owned::<sale_contract::Entity, _>(db, tenant_id, item.contract_id).await?;

    let fulfilled = unfulfill(item.fulfilled_quantity, quantity);
    let mut active: sale_contract_item::ActiveModel = item.into();
    active.fulfilled_quantity = Set(fulfilled);
    active.update(db).await.map_err(ServiceError::db_error)?;

    sync_status(db, contract).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn contract() -> sale_contract::Model {
        sale_contract::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            contract_number: "SC-1".to_string(),
            signed_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            delivery_deadline: None,
            status: SaleContractStatus::Active,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(contract_id: Uuid, quantity: Decimal, fulfilled: Decimal) -> sale_contract_item::Model {
        sale_contract_item::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            contract_id,
            cultivar_id: Uuid::new_v4(),
            quantity,
            fulfilled_quantity: fulfilled,
            unit_price: dec!(4.5),
            position: 0,
        }
    }

    #[test]
    fn view_totals_cover_all_items() {
        let header = contract();
        let view = SaleContractView::new(
            header.clone(),
            vec![
                item(header.id, dec!(1000), dec!(400)),
                item(header.id, dec!(500), dec!(0)),
            ],
        );

        assert_eq!(view.total_quantity, dec!(1500));
        assert_eq!(view.fulfilled_quantity, dec!(400));
        assert_eq!(view.remaining_quantity, dec!(1100));
        assert_eq!(view.total_value, dec!(6750.00));
        assert_eq!(view.items[0].remaining_quantity, dec!(600));
    }

    #[test]
    fn items_need_positive_quantities() {
        assert!(validate_item(dec!(0), dec!(1)).is_err());
        assert!(validate_item(dec!(1), dec!(-1)).is_err());
        assert!(validate_item(dec!(1), dec!(0)).is_ok());
    }
}
