use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repositories::TenantScoped;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MachineKind {
    #[sea_orm(string_value = "tractor")]
    Tractor,
    #[sea_orm(string_value = "harvester")]
    Harvester,
    #[sea_orm(string_value = "sprayer")]
    Sprayer,
    #[sea_orm(string_value = "truck")]
    Truck,
    #[sea_orm(string_value = "implement")]
    Implement,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "machines")]
#[schema(as = Machine)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub farm_id: Option<Uuid>,
    pub name: String,
    pub kind: MachineKind,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// Plate or serial number.
    pub identifier: Option<String>,
    /// Current hour meter reading; only moves forward through refuels.
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub hour_meter: Decimal,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Machine";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
