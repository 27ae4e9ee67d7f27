use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repositories::TenantScoped;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "refuels")]
#[schema(as = Refuel)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub machine_id: Uuid,
    pub tank_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub liters: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub hour_meter: Decimal,
    /// Machine reading before this refuel, restored when the refuel is removed.
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub previous_hour_meter: Decimal,
    pub refuel_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Refuel";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
