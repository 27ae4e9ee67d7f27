use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::AccountStatus;
use crate::repositories::TenantScoped;

/// Money owed to the tenant. Linked to the sale that created it, or manual when both
/// origin links are empty.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "accounts_receivable")]
#[schema(as = AccountReceivable)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: AccountStatus,
    pub paid_at: Option<NaiveDate>,
    pub sale_exit_id: Option<Uuid>,
    pub industry_sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_manual(&self) -> bool {
        self.sale_exit_id.is_none() && self.industry_sale_id.is_none()
    }

    pub fn is_paid(&self) -> bool {
        self.status == AccountStatus::Paid
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Account receivable";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
