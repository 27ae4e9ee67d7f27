use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::{fuel_tank, refuel},
    services::fuel::{FuelTankFilter, FuelTankInput, RefuelFilter, RefuelInput, SupplyInput},
    ApiResult, PaginatedResponse,
};

// Tanks

pub async fn list_tanks(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<FuelTankFilter>,
) -> ApiResult<PaginatedResponse<fuel_tank::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let tanks = state
        .services
        .fuel
        .list_tanks(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(tanks))
}

pub async fn get_tank(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<fuel_tank::Model> {
    Ok(success_response(
        state.services.fuel.get_tank(user.tenant_id, id).await?,
    ))
}

pub async fn create_tank(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FuelTankInput>,
) -> Created<fuel_tank::Model> {
    let tank = state
        .services
        .fuel
        .create_tank(user.tenant_id, payload)
        .await?;
    Ok(created_response(tank))
}

pub async fn update_tank(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FuelTankInput>,
) -> ApiResult<fuel_tank::Model> {
    let tank = state
        .services
        .fuel
        .update_tank(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(tank))
}

pub async fn delete_tank(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.fuel.delete_tank(user.tenant_id, id).await?;
    Ok(no_content_response())
}

/// Add fuel to a tank
#[utoipa::path(
    post,
    path = "/api/v1/fuel-tanks/{id}/supply",
    params(("id" = Uuid, Path, description = "Fuel tank id")),
    request_body = SupplyInput,
    responses(
        (status = 200, description = "Tank after the supply", body = crate::ApiResponse<fuel_tank::Model>),
        (status = 409, description = "Supply exceeds the tank capacity", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "machinery"
)]
pub async fn supply_tank(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplyInput>,
) -> ApiResult<fuel_tank::Model> {
    let tank = state
        .services
        .fuel
        .supply(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(tank))
}

// Refuels

pub async fn list_refuels(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<RefuelFilter>,
) -> ApiResult<PaginatedResponse<refuel::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let refuels = state
        .services
        .fuel
        .list_refuels(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(refuels))
}

pub async fn get_refuel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<refuel::Model> {
    Ok(success_response(
        state.services.fuel.get_refuel(user.tenant_id, id).await?,
    ))
}

/// Refuel a machine from a tank
#[utoipa::path(
    post,
    path = "/api/v1/refuels",
    request_body = RefuelInput,
    responses(
        (status = 201, description = "Refuel recorded", body = crate::ApiResponse<refuel::Model>),
        (status = 400, description = "Hour meter behind the machine's reading", body = crate::errors::ErrorResponse),
        (status = 422, description = "Tank does not hold enough fuel", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "machinery"
)]
pub async fn create_refuel(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RefuelInput>,
) -> Created<refuel::Model> {
    let refuel = state
        .services
        .fuel
        .create_refuel(user.tenant_id, payload)
        .await?;
    Ok(created_response(refuel))
}

pub async fn update_refuel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RefuelInput>,
) -> ApiResult<refuel::Model> {
    let refuel = state
        .services
        .fuel
        .update_refuel(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(refuel))
}

pub async fn delete_refuel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.fuel.delete_refuel(user.tenant_id, id).await?;
    Ok(no_content_response())
}
