//! Farms and their plots (talhões).

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
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
    models::{application, farm, fuel_tank, harvest, machine, planting, plot, product_stock},
    repositories::{count_where, find_owned, find_referenced, paginate, Page, TenantScoped},
    services::stock::ensure_positive,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FarmInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub state: Option<String>,
    pub total_area_ha: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlotInput {
    pub farm_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub area_ha: Decimal,
    pub soil_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FarmFilter {
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PlotFilter {
    pub farm_id: Option<Uuid>,
}

/// Fails when `plotted` hectares do not fit in a farm of `total` hectares.
pub fn ensure_area_fits(total: Option<Decimal>, plotted: Decimal) -> Result<(), ServiceError> {
    match total {
        Some(total) if plotted > total => Err(ServiceError::ValidationError(format!(
            "plots cover {} ha but the farm has {} ha",
            plotted, total
        ))),
        _ => Ok(()),
    }
}

async fn plotted_area<C: ConnectionTrait>(
    db: &C,
    farm_id: Uuid,
    except: Option<Uuid>,
) -> Result<Decimal, ServiceError> {
    let mut query = plot::Entity::find().filter(plot::Column::FarmId.eq(farm_id));
    if let Some(id) = except {
        query = query.filter(plot::Column::Id.ne(id));
    }
    let plots = query.all(db).await.map_err(ServiceError::db_error)?;
    Ok(plots.iter().map(|p| p.area_ha).sum())
}

#[derive(Clone)]
pub struct FarmService {
    db_pool: Arc<DbPool>,
}

impl FarmService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: FarmFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<farm::Model>, ServiceError> {
        let mut query = farm::Entity::find_in_tenant(tenant_id);
        if let Some(state) = filter.state {
            query = query.filter(farm::Column::State.eq(state.to_uppercase()));
        }
        paginate(
            &*self.db_pool,
            query.order_by_asc(farm::Column::Name),
            page,
            per_page,
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<farm::Model, ServiceError> {
        find_owned::<farm::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, tenant_id: Uuid, input: FarmInput) -> Result<farm::Model, ServiceError> {
        input.validate()?;
        if let Some(area) = input.total_area_ha {
            ensure_positive("total_area_ha", area)?;
        }

        let now = Utc::now();
        let created = farm::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            city: Set(input.city),
            state: Set(input.state.map(|s| s.to_uppercase())),
            total_area_ha: Set(input.total_area_ha),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(farm_id = %created.id, "farm created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: FarmInput,
    ) -> Result<farm::Model, ServiceError> {
        input.validate()?;
        if let Some(area) = input.total_area_ha {
            ensure_positive("total_area_ha", area)?;
        }
        let db = &*self.db_pool;
        let existing = find_owned::<farm::Entity, _>(db, tenant_id, id).await?;
        ensure_area_fits(input.total_area_ha, plotted_area(db, id, None).await?)?;

        let mut active: farm::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.city = Set(input.city);
        active.state = Set(input.state.map(|s| s.to_uppercase()));
        active.total_area_ha = Set(input.total_area_ha);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Deletes a farm with no plots, no fuel tanks and no input stock.
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<farm::Entity, _>(txn, tenant_id, id).await?;

                    if count_where::<plot::Entity, _, _>(txn, tenant_id, plot::Column::FarmId, id)
                        .await?
                        > 0
                    {
                        return Err(ServiceError::Conflict(format!(
                            "farm {} still has plots",
                            existing.name
                        )));
                    }
                    if count_where::<fuel_tank::Entity, _, _>(
                        txn,
                        tenant_id,
                        fuel_tank::Column::FarmId,
                        id,
                    )
                    .await?
                        > 0
                    {
                        return Err(ServiceError::Conflict(format!(
                            "farm {} still has fuel tanks",
                            existing.name
                        )));
                    }

                    let balances = product_stock::Entity::find_in_tenant(tenant_id)
                        .filter(product_stock::Column::FarmId.eq(id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if balances.iter().any(|b| b.quantity > Decimal::ZERO) {
                        return Err(ServiceError::Conflict(format!(
                            "farm {} still holds input stock",
                            existing.name
                        )));
                    }
                    product_stock::Entity::delete_many()
                        .filter(product_stock::Column::FarmId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    machine::Entity::update_many()
                        .col_expr(
                            machine::Column::FarmId,
                            sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
                        )
                        .filter(machine::Column::TenantId.eq(tenant_id))
                        .filter(machine::Column::FarmId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    existing.delete(txn).await.map_err(ServiceError::db_error)?;
                    Ok(())
                })
            })
            .await?;

        info!(farm_id = %id, "farm deleted");
        Ok(())
    }

    // Plots

    #[instrument(skip(self))]
    pub async fn list_plots(
        &self,
        tenant_id: Uuid,
        filter: PlotFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<plot::Model>, ServiceError> {
        let mut query = plot::Entity::find_in_tenant(tenant_id);
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(plot::Column::FarmId.eq(farm_id));
        }
        paginate(
            &*self.db_pool,
            query.order_by_asc(plot::Column::Name),
            page,
            per_page,
        )
        .await
    }

    /// All plots of one farm.
    pub async fn plots_of_farm(
        &self,
        tenant_id: Uuid,
        farm_id: Uuid,
    ) -> Result<Vec<plot::Model>, ServiceError> {
        let db = &*self.db_pool;
        let farm = find_owned::<farm::Entity, _>(db, tenant_id, farm_id).await?;
        farm.find_related(plot::Entity)
            .order_by_asc(plot::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_plot(&self, tenant_id: Uuid, id: Uuid) -> Result<plot::Model, ServiceError> {
        find_owned::<plot::Entity, _>(&*self.db_pool, tenant_id, id).await
    }

    #[instrument(skip(self, input), fields(farm_id = %input.farm_id))]
    pub async fn create_plot(
        &self,
        tenant_id: Uuid,
        input: PlotInput,
    ) -> Result<plot::Model, ServiceError> {
        input.validate()?;
        ensure_positive("area_ha", input.area_ha)?;

        let created = self
            .db_pool
            .transaction::<_, plot::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let farm =
                        find_referenced::<farm::Entity, _>(txn, tenant_id, input.farm_id).await?;
                    let plotted = plotted_area(txn, farm.id, None).await? + input.area_ha;
                    ensure_area_fits(farm.total_area_ha, plotted)?;

                    let now = Utc::now();
                    plot::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        farm_id: Set(farm.id),
                        name: Set(input.name.trim().to_string()),
                        area_ha: Set(input.area_ha),
                        soil_type: Set(input.soil_type),
                        notes: Set(input.notes),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)
                })
            })
            .await?;

        info!(plot_id = %created.id, "plot created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_plot(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: PlotInput,
    ) -> Result<plot::Model, ServiceError> {
        input.validate()?;
        ensure_positive("area_ha", input.area_ha)?;

        let updated = self
            .db_pool
            .transaction::<_, plot::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = find_owned::<plot::Entity, _>(txn, tenant_id, id).await?;
                    let farm =
                        find_referenced::<farm::Entity, _>(txn, tenant_id, input.farm_id).await?;
                    let plotted = plotted_area(txn, farm.id, Some(id)).await? + input.area_ha;
                    ensure_area_fits(farm.total_area_ha, plotted)?;

                    let mut active: plot::ActiveModel = existing.into();
                    active.farm_id = Set(farm.id);
                    active.name = Set(input.name.trim().to_string());
                    active.area_ha = Set(input.area_ha);
                    active.soil_type = Set(input.soil_type);
                    active.notes = Set(input.notes);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_plot(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = find_owned::<plot::Entity, _>(db, tenant_id, id).await?;

        let used = count_where::<planting::Entity, _, _>(db, tenant_id, planting::Column::PlotId, id)
            .await?
            + count_where::<harvest::Entity, _, _>(db, tenant_id, harvest::Column::PlotId, id)
                .await?
            + count_where::<application::Entity, _, _>(
                db,
                tenant_id,
                application::Column::PlotId,
                id,
            )
            .await?;
        if used > 0 {
            return Err(ServiceError::Conflict(format!(
                "plot {} has plantings, harvests or applications",
                existing.name
            )));
        }

        existing.delete(db).await.map_err(ServiceError::db_error)?;
        info!(plot_id = %id, "plot deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn plots_may_fill_but_not_exceed_the_farm() {
        assert!(ensure_area_fits(Some(dec!(100)), dec!(100)).is_ok());
        assert_matches!(
            ensure_area_fits(Some(dec!(100)), dec!(100.01)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn farms_without_area_accept_any_plot() {
        assert!(ensure_area_fits(None, dec!(1_000_000)).is_ok());
    }
}
