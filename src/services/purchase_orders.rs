//! Purchase orders of inputs, received over time through input purchases
//! linked to the order items.

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
        customer, product, purchase,
        purchase_order::{self, PurchaseOrderStatus},
        purchase_order_item,
    },
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::{ensure_not_negative, ensure_positive, fulfill, item_value, unfulfill},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderInput {
    pub supplier_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub order_number: String,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderInput {
    pub supplier_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub order_number: String,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemUpdate {
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOrderItemView {
    #[serde(flatten)]
    pub item: purchase_order_item::Model,
    pub remaining_quantity: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOrderView {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub items: Vec<PurchaseOrderItemView>,
    pub total_quantity: Decimal,
    pub fulfilled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub total_value: Decimal,
}

impl PurchaseOrderView {
    pub fn new(order: purchase_order::Model, items: Vec<purchase_order_item::Model>) -> Self {
        let items: Vec<_> = items
            .into_iter()
            .map(|item| PurchaseOrderItemView {
                remaining_quantity: item.quantity - item.fulfilled_quantity,
                total_value: item_value(item.quantity, item.unit_price),
                item,
            })
            .collect();
        Self {
            total_quantity: items.iter().map(|i| i.item.quantity).sum(),
            fulfilled_quantity: items.iter().map(|i| i.item.fulfilled_quantity).sum(),
            remaining_quantity: items.iter().map(|i| i.remaining_quantity).sum(),
            total_value: items.iter().map(|i| i.total_value).sum(),
            order,
            items,
        }
    }
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PurchaseOrderService {
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
        filter: PurchaseOrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<PurchaseOrderView>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = purchase_order::Entity::find_in_tenant(tenant_id);
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase_order::Column::SupplierId.eq(supplier_id));
        }
        let orders = paginate(
            db,
            query.order_by_desc(purchase_order::Column::OrderDate),
            page,
            per_page,
        )
        .await?;

        let ids: Vec<Uuid> = orders.items.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<purchase_order_item::Model>> = HashMap::new();
        for item in purchase_order_item::Entity::find()
            .filter(purchase_order_item::Column::OrderId.is_in(ids))
            .order_by_asc(purchase_order_item::Column::Position)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders.map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            PurchaseOrderView::new(order, items)
        }))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<PurchaseOrderView, ServiceError> {
        load_view(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: PurchaseOrderInput,
    ) -> Result<PurchaseOrderView, ServiceError> {
        input.validate()?;
        for item in &input.items {
            ensure_positive("quantity", item.quantity)?;
            ensure_not_negative("unit_price", item.unit_price)?;
        }

        let order_id = Uuid::new_v4();
        let view = self
            .db_pool
            .transaction::<_, PurchaseOrderView, ServiceError>(|txn| {
                Box::pin(async move {
                    find_referenced::<customer::Entity, _>(txn, tenant_id, input.supplier_id)
                        .await?;
                    ensure_number_free(txn, tenant_id, &input.order_number, None).await?;

                    let now = Utc::now();
                    let order = purchase_order::ActiveModel {
                        id: Set(order_id),
                        tenant_id: Set(tenant_id),
                        supplier_id: Set(input.supplier_id),
                        order_number: Set(input.order_number.trim().to_string()),
                        order_date: Set(input.order_date),
                        expected_date: Set(input.expected_date),
                        status: Set(PurchaseOrderStatus::Open),
                        notes: Set(input.notes),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut items = Vec::with_capacity(input.items.len());
                    for (position, item) in (0i32..).zip(input.items) {
                        find_referenced::<product::Entity, _>(txn, tenant_id, item.product_id)
                            .await?;
                        let created = purchase_order_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            tenant_id: Set(tenant_id),
                            order_id: Set(order_id),
                            product_id: Set(item.product_id),
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

                    Ok(PurchaseOrderView::new(order, items))
                })
            })
            .await?;

        info!(order_id = %view.order.id, "purchase order created");
        Ok(view)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdatePurchaseOrderInput,
    ) -> Result<PurchaseOrderView, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        let view = load_view(db, tenant_id, id).await?;
        if view.order.status == PurchaseOrderStatus::Cancelled {
            return Err(ServiceError::Conflict(format!(
                "purchase order {} is cancelled",
                view.order.order_number
            )));
        }
        if input.supplier_id != view.order.supplier_id {
            if view.fulfilled_quantity > Decimal::ZERO {
                return Err(ServiceError::Conflict(
                    "supplier cannot change after receipts were recorded".to_string(),
                ));
            }
            find_referenced::<customer::Entity, _>(db, tenant_id, input.supplier_id).await?;
        }
        ensure_number_free(db, tenant_id, &input.order_number, Some(id)).await?;

        let mut active: purchase_order::ActiveModel = view.order.into();
        active.supplier_id = Set(input.supplier_id);
        active.order_number = Set(input.order_number.trim().to_string());
        active.order_date = Set(input.order_date);
        active.expected_date = Set(input.expected_date);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        let order = active.update(db).await.map_err(ServiceError::db_error)?;

        let items = view.items.into_iter().map(|i| i.item).collect();
        Ok(PurchaseOrderView::new(order, items))
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        item_id: Uuid,
        input: OrderItemUpdate,
    ) -> Result<PurchaseOrderView, ServiceError> {
        ensure_positive("quantity", input.quantity)?;
        ensure_not_negative("unit_price", input.unit_price)?;

        let (view, event) = self
            .db_pool
            .transaction::<_, (PurchaseOrderView, Option<Event>), ServiceError>(|txn| {
                Box::pin(async move {
                    let order = find_owned::<purchase_order::Entity, _>(txn, tenant_id, id).await?;
                    if order.status == PurchaseOrderStatus::Cancelled {
                        return Err(ServiceError::Conflict(format!(
                            "purchase order {} is cancelled",
                            order.order_number
                        )));
                    }
                    let item =
                        find_owned::<purchase_order_item::Entity, _>(txn, tenant_id, item_id)
                            .await?;
                    if item.order_id != id {
                        return Err(ServiceError::not_found("Purchase order item", item_id));
                    }
                    if input.quantity < item.fulfilled_quantity {
                        return Err(ServiceError::Conflict(format!(
                            "quantity {} is below the received quantity {}",
                            input.quantity, item.fulfilled_quantity
                        )));
                    }

                    let mut active: purchase_order_item::ActiveModel = item.into();
                    active.quantity = Set(input.quantity);
                    active.unit_price = Set(input.unit_price);
                    active.update(txn).await.map_err(ServiceError::db_error)?;

                    let event = sync_status(txn, order).await?;
                    Ok((load_view(txn, tenant_id, id).await?, event))
                })
            })
            .await?;

        if let Some(event) = event {
            self.event_sender.send_or_log(event).await;
        }
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, tenant_id: Uuid, id: Uuid) -> Result<PurchaseOrderView, ServiceError> {
        let db = &*self.db_pool;
        let view = load_view(db, tenant_id, id).await?;
        if view.order.status != PurchaseOrderStatus::Open {
            return Err(ServiceError::Conflict(format!(
                "only open orders can be cancelled; {} is {:?}",
                view.order.order_number, view.order.status
            )));
        }

        let mut active: purchase_order::ActiveModel = view.order.into();
        active.status = Set(PurchaseOrderStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let order = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderCancelled {
                tenant_id,
                order_id: id,
            })
            .await;

        let items = view.items.into_iter().map(|i| i.item).collect();
        Ok(PurchaseOrderView::new(order, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let order = find_owned::<purchase_order::Entity, _>(txn, tenant_id, id).await?;
                    let items = order
                        .find_related(purchase_order_item::Entity)
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
                    let receipts = purchase::Entity::find_in_tenant(tenant_id)
                        .filter(purchase::Column::PurchaseOrderItemId.is_in(item_ids))
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if receipts > 0 || items.iter().any(|i| i.fulfilled_quantity > Decimal::ZERO)
                    {
                        return Err(ServiceError::Conflict(format!(
                            "purchase order {} has receipts",
                            order.order_number
                        )));
                    }

                    purchase_order_item::Entity::delete_many()
                        .filter(purchase_order_item::Column::OrderId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    order.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(order_id = %id, "purchase order deleted");
        Ok(())
    }
}

async fn load_view<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<PurchaseOrderView, ServiceError> {
    let order = find_owned::<purchase_order::Entity, _>(db, tenant_id, id).await?;
    let items = order
        .find_related(purchase_order_item::Entity)
        .order_by_asc(purchase_order_item::Column::Position)
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(PurchaseOrderView::new(order, items))
}

async fn ensure_number_free<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    number: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = purchase_order::Entity::find_in_tenant(tenant_id)
        .filter(purchase_order::Column::OrderNumber.eq(number.trim()));
    if let Some(id) = except {
        query = query.filter(purchase_order::Column::Id.ne(id));
    }
    if query.count(db).await.map_err(ServiceError::db_error)? > 0 {
        return Err(ServiceError::Conflict(format!(
            "order number {} is already in use",
            number.trim()
        )));
    }
    Ok(())
}

async fn sync_status<C: ConnectionTrait>(
    db: &C,
    order: purchase_order::Model,
) -> Result<Option<Event>, ServiceError> {
    let items = order
        .find_related(purchase_order_item::Entity)
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;
    let complete = !items.is_empty() && items.iter().all(|i| i.fulfilled_quantity >= i.quantity);

    let (next, event) = match (order.status, complete) {
        (PurchaseOrderStatus::Open, true) => (
            PurchaseOrderStatus::Completed,
            Some(Event::PurchaseOrderCompleted {
                tenant_id: order.tenant_id,
                order_id: order.id,
            }),
        ),
        (PurchaseOrderStatus::Completed, false) => (PurchaseOrderStatus::Open, None),
        _ => return Ok(None),
    };

    let mut active: purchase_order::ActiveModel = order.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(ServiceError::db_error)?;
    Ok(event)
}

/// Records a receipt of `quantity` against an order item. The item must belong
/// to an open order of `supplier_id` and be for `product_id`.
pub(crate) async fn receive<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
    supplier_id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
) -> Result<Option<Event>, ServiceError> {
    let item = find_referenced::<purchase_order_item::Entity, _>(db, tenant_id, item_id).await?;
    let order = find_owned::<purchase_order::Entity, _>(db, tenant_id, item.order_id).await?;

    if order.status != PurchaseOrderStatus::Open {
        return Err(ServiceError::Conflict(format!(
            "purchase order {} is not open",
            order.order_number
        )));
    }
    if order.supplier_id != supplier_id {
        return Err(ServiceError::ValidationError(format!(
            "purchase order {} belongs to another supplier",
            order.order_number
        )));
    }
    if item.product_id != product_id {
        return Err(ServiceError::ValidationError(format!(
            "order item {} is for another product",
            item_id
        )));
    }

    let fulfilled = fulfill(item.quantity, item.fulfilled_quantity, quantity)?;
    let mut active: purchase_order_item::ActiveModel = item.into();
    active.fulfilled_quantity = Set(fulfilled);
    active.update(db).await.map_err(ServiceError::db_error)?;

    sync_status(db, order).await
}

/// Takes a receipt back, reopening the order if it had been completed.
pub(crate) async fn unreceive<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
    quantity: Decimal,
) -> Result<(), ServiceError> {
    let item = find_owned::<purchase_order_item::Entity, _>(db, tenant_id, item_id).await?;
    let order = find_owned::<purchase_order::Entity, _>(db, tenant_id, item.order_id).await?;

    let fulfilled = unfulfill(item.fulfilled_quantity, quantity);
    let mut active: purchase_order_item::ActiveModel = item.into();
    active.fulfilled_quantity = Set(fulfilled);
    active.update(db).await.map_err(ServiceError::db_error)?;

    sync_status(db, order).await.map(|_| ())
}
