use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repositories::TenantScoped;

/// A seed variety with its on-hand stock.
///
/// `stock` is set once at creation and afterwards only moved by buys, plantings,
/// harvests, discards and sales.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "cultivars")]
#[schema(as = Cultivar)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub crop: String,
    pub maturity_group: Option<String>,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub stock: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub min_stock: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Below its own minimum, or below `default_threshold` when it has none.
    pub fn is_low_stock(&self, default_threshold: Decimal) -> bool {
        match self.min_stock {
            Some(min) => self.stock < min,
            None => self.stock < default_threshold,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const LABEL: &'static str = "Cultivar";

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
