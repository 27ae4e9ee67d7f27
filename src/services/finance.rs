//! Accounts receivable and payable.
//!
//! Linked accounts are created, replaced and removed by their origin record
//! (sale, purchase, buy, maintenance) through the `pub(crate)` helpers at the
//! bottom of this file. A linked account that is paid freezes its origin.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
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
    models::{account_payable, account_receivable, customer, AccountStatus, PaymentTerm},
    repositories::{find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::ensure_positive,
};

/// Manual receivable or payable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AccountInput {
    /// Customer (receivables, required) or supplier (payables, optional).
    pub counterparty_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PayAccountInput {
    /// Defaults to today.
    pub paid_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AccountFilter {
    pub status: Option<AccountStatus>,
    /// Pending accounts whose due date has passed.
    pub overdue: Option<bool>,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Record a receivable was generated from.
#[derive(Debug, Clone, Copy)]
pub enum ReceivableOrigin {
    SaleExit(Uuid),
    IndustrySale(Uuid),
}

/// Record a payable was generated from.
#[derive(Debug, Clone, Copy)]
pub enum PayableOrigin {
    Purchase(Uuid),
    Buy(Uuid),
    Maintenance(Uuid),
}

/// Settlement terms of a purchase or sale.
#[derive(Debug, Clone, Copy)]
pub struct Settlement {
    pub payment: PaymentTerm,
    pub due_date: Option<NaiveDate>,
}

impl Settlement {
    /// Term settlements need a due date.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.payment == PaymentTerm::Term && self.due_date.is_none() {
            return Err(ServiceError::ValidationError(
                "due_date is required for term payments".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct FinanceService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FinanceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    // Receivables

    #[instrument(skip(self))]
    pub async fn list_receivables(
        &self,
        tenant_id: Uuid,
        filter: AccountFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<account_receivable::Model>, ServiceError> {
        use account_receivable::{Column, Entity};

        let mut query = Entity::find_in_tenant(tenant_id);
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status));
        }
        if filter.overdue.unwrap_or(false) {
            query = query
                .filter(Column::Status.eq(AccountStatus::Pending))
                .filter(Column::DueDate.lt(Utc::now().date_naive()));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(Column::CustomerId.eq(customer_id));
        }

        paginate(
            &*self.db_pool,
            query.order_by_asc(Column::DueDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_receivable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<account_receivable::Model, ServiceError> {
        find_owned::<account_receivable::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_receivable(
        &self,
        tenant_id: Uuid,
        input: AccountInput,
    ) -> Result<account_receivable::Model, ServiceError> {
        input.validate()?;
        ensure_positive("amount", input.amount)?;
        let db = &*self.db_pool;
        let customer_id = input.counterparty_id.ok_or_else(|| {
            ServiceError::ValidationError("counterparty_id is required".to_string())
        })?;
        find_referenced::<customer::Entity, _>(db, tenant_id, customer_id).await?;

        let now = Utc::now();
        let created = account_receivable::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            customer_id: Set(customer_id),
            description: Set(input.description),
            amount: Set(input.amount.round_dp(2)),
            due_date: Set(input.due_date),
            status: Set(AccountStatus::Pending),
            paid_at: Set(None),
            sale_exit_id: Set(None),
            industry_sale_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(receivable_id = %created.id, "manual receivable created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_receivable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AccountInput,
    ) -> Result<account_receivable::Model, ServiceError> {
        input.validate()?;
        ensure_positive("amount", input.amount)?;
        let db = &*self.db_pool;
        let current = find_owned::<account_receivable::Entity, _>(db, tenant_id, id).await?;
        ensure_editable(current.is_manual(), current.is_paid(), "receivable")?;

        let mut active: account_receivable::ActiveModel = current.into();
        if let Some(customer_id) = input.counterparty_id {
            find_referenced::<customer::Entity, _>(db, tenant_id, customer_id).await?;
            active.customer_id = Set(customer_id);
        }
        active.description = Set(input.description);
        active.amount = Set(input.amount.round_dp(2));
        active.due_date = Set(input.due_date);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_receivable(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_receivable::Entity, _>(db, tenant_id, id).await?;
        ensure_editable(current.is_manual(), current.is_paid(), "receivable")?;
        current.delete(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn pay_receivable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PayAccountInput,
    ) -> Result<account_receivable::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_receivable::Entity, _>(db, tenant_id, id).await?;
        if current.is_paid() {
            return Err(ServiceError::Conflict(format!(
                "receivable {} is already paid",
                id
            )));
        }

        let mut active: account_receivable::ActiveModel = current.into();
        active.status = Set(AccountStatus::Paid);
        active.paid_at = Set(Some(input.paid_at.unwrap_or_else(|| Utc::now().date_naive())));
        active.updated_at = Set(Utc::now());
        let paid = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ReceivablePaid {
                tenant_id,
                receivable_id: paid.id,
                amount: paid.amount,
            })
            .await;
        Ok(paid)
    }

    #[instrument(skip(self))]
    pub async fn reopen_receivable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<account_receivable::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_receivable::Entity, _>(db, tenant_id, id).await?;
        if !current.is_paid() {
            return Err(ServiceError::Conflict(format!(
                "receivable {} is not paid",
                id
            )));
        }

        let mut active: account_receivable::ActiveModel = current.into();
        active.status = Set(AccountStatus::Pending);
        active.paid_at = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    // Payables

    #[instrument(skip(self))]
    pub async fn list_payables(
        &self,
        tenant_id: Uuid,
        filter: AccountFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<account_payable::Model>, ServiceError> {
        use account_payable::{Column, Entity};

        let mut query = Entity::find_in_tenant(tenant_id);
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status));
        }
        if filter.overdue.unwrap_or(false) {
            query = query
                .filter(Column::Status.eq(AccountStatus::Pending))
                .filter(Column::DueDate.lt(Utc::now().date_naive()));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }

        paginate(
            &*self.db_pool,
            query.order_by_asc(Column::DueDate),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_payable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<account_payable::Model, ServiceError> {
        find_owned::<account_payable::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_payable(
        &self,
        tenant_id: Uuid,
        input: AccountInput,
    ) -> Result<account_payable::Model, ServiceError> {
        input.validate()?;
        ensure_positive("amount", input.amount)?;
        let db = &*self.db_pool;
        if let Some(supplier_id) = input.counterparty_id {
            find_referenced::<customer::Entity, _>(db, tenant_id, supplier_id).await?;
        }

        let now = Utc::now();
        let created = account_payable::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            supplier_id: Set(input.counterparty_id),
            description: Set(input.description),
            amount: Set(input.amount.round_dp(2)),
            due_date: Set(input.due_date),
            status: Set(AccountStatus::Pending),
            paid_at: Set(None),
            purchase_id: Set(None),
            buy_id: Set(None),
            maintenance_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(payable_id = %created.id, "manual payable created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_payable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AccountInput,
    ) -> Result<account_payable::Model, ServiceError> {
        input.validate()?;
        ensure_positive("amount", input.amount)?;
        let db = &*self.db_pool;
        let current = find_owned::<account_payable::Entity, _>(db, tenant_id, id).await?;
        ensure_editable(current.is_manual(), current.is_paid(), "payable")?;
        if let Some(supplier_id) = input.counterparty_id {
            find_referenced::<customer::Entity, _>(db, tenant_id, supplier_id).await?;
        }

        let mut active: account_payable::ActiveModel = current.into();
        active.supplier_id = Set(input.counterparty_id);
        active.description = Set(input.description);
        active.amount = Set(input.amount.round_dp(2));
        active.due_date = Set(input.due_date);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_payable(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_payable::Entity, _>(db, tenant_id, id).await?;
        ensure_editable(current.is_manual(), current.is_paid(), "payable")?;
        current.delete(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn pay_payable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PayAccountInput,
    ) -> Result<account_payable::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_payable::Entity, _>(db, tenant_id, id).await?;
        if current.is_paid() {
            return Err(ServiceError::Conflict(format!(
                "payable {} is already paid",
                id
            )));
        }

        let mut active: account_payable::ActiveModel = current.into();
        active.status = Set(AccountStatus::Paid);
        active.paid_at = Set(Some(input.paid_at.unwrap_or_else(|| Utc::now().date_naive())));
        active.updated_at = Set(Utc::now());
        let paid = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::PayablePaid {
                tenant_id,
                payable_id: paid.id,
                amount: paid.amount,
            })
            .await;
        Ok(paid)
    }

    #[instrument(skip(self))]
    pub async fn reopen_payable(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<account_payable::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = find_owned::<account_payable::Entity, _>(db, tenant_id, id).await?;
        if !current.is_paid() {
            return Err(ServiceError::Conflict(format!("payable {} is not paid", id)));
        }

        let mut active: account_payable::ActiveModel = current.into();
        active.status = Set(AccountStatus::Pending);
        active.paid_at = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }
}

fn ensure_editable(manual: bool, paid: bool, label: &str) -> Result<(), ServiceError> {
    if !manual {
        return Err(ServiceError::Conflict(format!(
            "{} was generated by another record and changes with it",
            label
        )));
    }
    if paid {
        return Err(ServiceError::Conflict(format!(
            "{} is paid; reopen it first",
            label
        )));
    }
    Ok(())
}

/// Receivable generated by `origin`, if any.
pub(crate) async fn linked_receivable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: ReceivableOrigin,
) -> Result<Option<account_receivable::Model>, ServiceError> {
    use account_receivable::{Column, Entity};

    let query = Entity::find_in_tenant(tenant_id);
    let query = match origin {
        ReceivableOrigin::SaleExit(id) => query.filter(Column::SaleExitId.eq(id)),
        ReceivableOrigin::IndustrySale(id) => query.filter(Column::IndustrySaleId.eq(id)),
    };
    query.one(db).await.map_err(ServiceError::db_error)
}

/// Fails with a conflict when the receivable of `origin` is paid.
pub(crate) async fn ensure_receivable_open<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: ReceivableOrigin,
    what: &str,
) -> Result<Option<account_receivable::Model>, ServiceError> {
    let linked = linked_receivable(db, tenant_id, origin).await?;
    if linked.as_ref().map_or(false, |r| r.is_paid()) {
        return Err(ServiceError::Conflict(format!(
            "{} has a paid receivable and can no longer change",
            what
        )));
    }
    Ok(linked)
}

/// Creates the receivable of a term sale. Cash sales create nothing.
pub(crate) async fn open_receivable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: ReceivableOrigin,
    customer_id: Uuid,
    description: String,
    amount: Decimal,
    settlement: Settlement,
) -> Result<Option<account_receivable::Model>, ServiceError> {
    let due_date = match (settlement.payment, settlement.due_date) {
        (PaymentTerm::Term, Some(due_date)) => due_date,
        _ => return Ok(None),
    };

    let (sale_exit_id, industry_sale_id) = match origin {
        ReceivableOrigin::SaleExit(id) => (Some(id), None),
        ReceivableOrigin::IndustrySale(id) => (None, Some(id)),
    };

    let now = Utc::now();
    account_receivable::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        customer_id: Set(customer_id),
        description: Set(description),
        amount: Set(amount),
        due_date: Set(due_date),
        status: Set(AccountStatus::Pending),
        paid_at: Set(None),
        sale_exit_id: Set(sale_exit_id),
        industry_sale_id: Set(industry_sale_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map(Some)
    .map_err(ServiceError::db_error)
}

/// Removes the (unpaid) receivable of `origin`.
pub(crate) async fn close_receivable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: ReceivableOrigin,
    what: &str,
) -> Result<(), ServiceError> {
    if let Some(linked) = ensure_receivable_open(db, tenant_id, origin, what).await? {
        linked.delete(db).await.map_err(ServiceError::db_error)?;
    }
    Ok(())
}

pub(crate) async fn linked_payable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: PayableOrigin,
) -> Result<Option<account_payable::Model>, ServiceError> {
    use account_payable::{Column, Entity};

    let query = Entity::find_in_tenant(tenant_id);
    let query = match origin {
        PayableOrigin::Purchase(id) => query.filter(Column::PurchaseId.eq(id)),
        PayableOrigin::Buy(id) => query.filter(Column::BuyId.eq(id)),
        PayableOrigin::Maintenance(id) => query.filter(Column::MaintenanceId.eq(id)),
    };
    query.one(db).await.map_err(ServiceError::db_error)
}

/// Fails with a conflict when the payable of `origin` is paid.
pub(crate) async fn ensure_payable_open<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: PayableOrigin,
    what: &str,
) -> Result<Option<account_payable::Model>, ServiceError> {
    let linked = linked_payable(db, tenant_id, origin).await?;
    if linked.as_ref().map_or(false, |p| p.is_paid()) {
        return Err(ServiceError::Conflict(format!(
            "{} has a paid payable and can no longer change",
            what
        )));
    }
    Ok(linked)
}

/// Creates the payable of a term purchase. Cash purchases create nothing.
pub(crate) async fn open_payable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: PayableOrigin,
    supplier_id: Option<Uuid>,
    description: String,
    amount: Decimal,
    settlement: Settlement,
) -> Result<Option<account_payable::Model>, ServiceError> {
    let due_date = match (settlement.payment, settlement.due_date) {
        (PaymentTerm::Term, Some(due_date)) => due_date,
        _ => return Ok(None),
    };

    let (purchase_id, buy_id, maintenance_id) = match origin {
        PayableOrigin::Purchase(id) => (Some(id), None, None),
        PayableOrigin::Buy(id) => (None, Some(id), None),
        PayableOrigin::Maintenance(id) => (None, None, Some(id)),
    };

    let now = Utc::now();
    account_payable::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        supplier_id: Set(supplier_id),
        description: Set(description),
        amount: Set(amount),
        due_date: Set(due_date),
        status: Set(AccountStatus::Pending),
        paid_at: Set(None),
        purchase_id: Set(purchase_id),
        buy_id: Set(buy_id),
        maintenance_id: Set(maintenance_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map(Some)
    .map_err(ServiceError::db_error)
}

/// Removes the (unpaid) payable of `origin`.
pub(crate) async fn close_payable<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    origin: PayableOrigin,
    what: &str,
) -> Result<(), ServiceError> {
    if let Some(linked) = ensure_payable_open(db, tenant_id, origin, what).await? {
        linked.delete(db).await.map_err(ServiceError::db_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn term_settlement_needs_due_date() {
        let settlement = Settlement {
            payment: PaymentTerm::Term,
            due_date: None,
        };
        assert_matches!(settlement.validate(), Err(ServiceError::ValidationError(_)));

        let cash = Settlement {
            payment: PaymentTerm::Cash,
            due_date: None,
        };
        assert!(cash.validate().is_ok());
    }

    #[test]
    fn generated_accounts_are_not_editable() {
        assert_matches!(
            ensure_editable(false, false, "receivable"),
            Err(ServiceError::Conflict(_))
        );
        assert_matches!(
            ensure_editable(true, true, "payable"),
            Err(ServiceError::Conflict(_))
        );
        assert!(ensure_editable(true, false, "payable").is_ok());
    }
}
