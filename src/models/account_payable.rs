use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::AccountStatus;
use crate::repositories::TenantScoped;

/// Money the tenant owes. Linked to at most one of purchase, buy or maintenance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "accounts_payable")]
#[schema(as = AccountPayable)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: AccountStatus,
    pub paid_at: Option<NaiveDate>,
    pub purchase_id: Option<Uuid>,
    pub buy_id: Option<Uuid>,
    pub maintenance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_manual(&self) -> bool {
        self.purchase_id.is_none() && self.buy_id.is_none() && self.maintenance_id.is_none()
    }

    pub fn is_paid(&self) -> bool {
        self.status == AccountStatus::Paid
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Account payable";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
