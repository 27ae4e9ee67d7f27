use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repositories::TenantScoped;

/// Diesel tank at a farm. `0 <= stock_liters <= capacity_liters`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "fuel_tanks")]
#[schema(as = FuelTank)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub capacity_liters: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub stock_liters: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Fuel tank";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
