//! Tenant summary for the dashboard.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        account_payable, account_receivable, cultivar, farm, fuel_tank, industry_sale, plot,
        sale_contract::{self, SaleContractStatus},
        sale_contract_item, sale_exit, AccountStatus,
    },
    repositories::TenantScoped,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Start of the sales period (inclusive).
    pub from: Option<NaiveDate>,
    /// End of the sales period (inclusive).
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockCultivar {
    pub id: Uuid,
    pub name: String,
    pub stock: Decimal,
    pub minimum: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AccountTotals {
    pub pending_count: u64,
    pub pending_total: Decimal,
    pub overdue_count: u64,
    pub overdue_total: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SalesTotals {
    pub seed_sales_count: u64,
    pub seed_quantity: Decimal,
    pub seed_value: Decimal,
    pub industry_sales_count: u64,
    pub industry_quantity: Decimal,
    pub industry_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TankLevel {
    pub id: Uuid,
    pub name: String,
    pub stock_liters: Decimal,
    pub capacity_liters: Decimal,
    /// Fill level in percent, two decimals.
    pub level_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub farm_count: u64,
    pub plot_count: u64,
    pub plotted_area_ha: Decimal,
    pub cultivar_count: u64,
    pub seed_stock_total: Decimal,
    pub low_stock: Vec<LowStockCultivar>,
    pub receivables: AccountTotals,
    pub payables: AccountTotals,
    pub sales: SalesTotals,
    pub active_contracts: u64,
    pub contract_remaining_quantity: Decimal,
    pub fuel_tanks: Vec<TankLevel>,
}

/// Minimum a cultivar is compared against: its own, or the tenant-wide threshold.
pub fn stock_minimum(min_stock: Option<Decimal>, threshold: i64) -> Decimal {
    min_stock.unwrap_or_else(|| Decimal::from(threshold))
}

pub fn level_percent(stock: Decimal, capacity: Decimal) -> Decimal {
    if capacity.is_zero() {
        Decimal::ZERO
    } else {
        (stock * Decimal::ONE_HUNDRED / capacity).round_dp(2)
    }
}

fn totals(rows: impl Iterator<Item = (Decimal, NaiveDate)>, today: NaiveDate) -> AccountTotals {
    let mut totals = AccountTotals::default();
    for (amount, due_date) in rows {
        totals.pending_count += 1;
        totals.pending_total += amount;
        if due_date < today {
            totals.overdue_count += 1;
            totals.overdue_total += amount;
        }
    }
    totals
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    low_stock_threshold: i64,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, low_stock_threshold: i64) -> Self {
        Self {
            db_pool,
            low_stock_threshold,
        }
    }

    #[instrument(skip(self))]
    pub async fn summary(
        &self,
        tenant_id: Uuid,
        query: DashboardQuery,
    ) -> Result<DashboardSummary, ServiceError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(ServiceError::ValidationError(
                    "from must not be after to".to_string(),
                ));
            }
        }
        let db = &*self.db_pool;
        let today = Utc::now().date_naive();

        let farm_count = farm::Entity::find_in_tenant(tenant_id)
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let plots = plot::Entity::find_in_tenant(tenant_id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let cultivars = cultivar::Entity::find_in_tenant(tenant_id)
            .order_by_asc(cultivar::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let low_stock = cultivars
            .iter()
            .filter_map(|c| {
                let minimum = stock_minimum(c.min_stock, self.low_stock_threshold);
                (c.stock < minimum).then(|| LowStockCultivar {
                    id: c.id,
                    name: c.name.clone(),
                    stock: c.stock,
                    minimum,
                })
            })
            .collect();

        let receivables = account_receivable::Entity::find_in_tenant(tenant_id)
            .filter(account_receivable::Column::Status.eq(AccountStatus::Pending))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let payables = account_payable::Entity::find_in_tenant(tenant_id)
            .filter(account_payable::Column::Status.eq(AccountStatus::Pending))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut exits = sale_exit::Entity::find_in_tenant(tenant_id);
        let mut industry = industry_sale::Entity::find_in_tenant(tenant_id);
        if let Some(from) = query.from {
            exits = exits.filter(sale_exit::Column::SaleDate.gte(from));
            industry = industry.filter(industry_sale::Column::SaleDate.gte(from));
        }
        if let Some(to) = query.to {
            exits = exits.filter(sale_exit::Column::SaleDate.lte(to));
            industry = industry.filter(industry_sale::Column::SaleDate.lte(to));
        }
        let exits = exits.all(db).await.map_err(ServiceError::db_error)?;
        let industry = industry.all(db).await.map_err(ServiceError::db_error)?;

        let contracts = sale_contract::Entity::find_in_tenant(tenant_id)
            .filter(sale_contract::Column::Status.eq(SaleContractStatus::Active))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let contract_items = sale_contract_item::Entity::find()
            .filter(sale_contract_item::Column::ContractId.is_in(contracts.iter().map(|c| c.id)))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let fuel_tanks = fuel_tank::Entity::find_in_tenant(tenant_id)
            .order_by_asc(fuel_tank::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|t| TankLevel {
                level_percent: level_percent(t.stock_liters, t.capacity_liters),
                id: t.id,
                name: t.name,
                stock_liters: t.stock_liters,
                capacity_liters: t.capacity_liters,
            })
            .collect();

        Ok(DashboardSummary {
            from: query.from,
            to: query.to,
            farm_count,
            plot_count: plots.len() as u64,
            plotted_area_ha: plots.iter().map(|p| p.area_ha).sum(),
            cultivar_count: cultivars.len() as u64,
            seed_stock_total: cultivars.iter().map(|c| c.stock).sum(),
            low_stock,
            receivables: totals(receivables.iter().map(|r| (r.amount, r.due_date)), today),
            payables: totals(payables.iter().map(|p| (p.amount, p.due_date)), today),
            sales: SalesTotals {
                seed_sales_count: exits.len() as u64,
                seed_quantity: exits.iter().map(|s| s.quantity).sum(),
                seed_value: exits.iter().map(|s| s.total_value).sum(),
                industry_sales_count: industry.len() as u64,
                industry_quantity: industry.iter().map(|s| s.quantity).sum(),
                industry_value: industry.iter().map(|s| s.total_value).sum(),
            },
            active_contracts: contracts.len() as u64,
            contract_remaining_quantity: contract_items
                .iter()
                .map(|i| i.quantity - i.fulfilled_quantity)
                .sum(),
            fuel_tanks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cultivar_minimum_falls_back_to_threshold() {
        assert_eq!(stock_minimum(Some(dec!(500)), 10), dec!(500));
        assert_eq!(stock_minimum(None, 10), dec!(10));
    }

    #[test]
    fn tank_level_is_a_percentage() {
        assert_eq!(level_percent(dec!(2500), dec!(10000)), dec!(25.00));
        assert_eq!(level_percent(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(level_percent(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn overdue_accounts_are_counted_separately() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let rows = vec![
            (dec!(100), NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
            (dec!(50), NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()),
            (dec!(25), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        ];
        let totals = totals(rows.into_iter(), today);
        assert_eq!(totals.pending_count, 3);
        assert_eq!(totals.pending_total, dec!(175));
        assert_eq!(totals.overdue_count, 1);
        assert_eq!(totals.overdue_total, dec!(100));
    }
}
