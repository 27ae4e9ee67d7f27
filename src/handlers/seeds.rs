//! Seed stock movements other than sales: buys, plantings, harvests and discards.

use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::{buy, discard, harvest, planting},
    services::seed_movements::{
        BuyInput, DiscardInput, HarvestInput, PlantingInput, SeedMovementFilter,
    },
    ApiResult, PaginatedResponse,
};

// Buys

pub async fn list_buys(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SeedMovementFilter>,
) -> ApiResult<PaginatedResponse<buy::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let buys = state
        .services
        .seed_movements
        .list_buys(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(buys))
}

pub async fn get_buy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<buy::Model> {
    Ok(success_response(
        state
            .services
            .seed_movements
            .get_buy(user.tenant_id, id)
            .await?,
    ))
}

/// Record a seed purchase
#[utoipa::path(
    post,
    path = "/api/v1/buys",
    request_body = BuyInput,
    responses(
        (status = 201, description = "Seed purchase recorded", body = crate::ApiResponse<buy::Model>),
        (status = 400, description = "Invalid purchase", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn create_buy(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BuyInput>,
) -> Created<buy::Model> {
    let buy = state
        .services
        .seed_movements
        .create_buy(user.tenant_id, payload)
        .await?;
    Ok(created_response(buy))
}

pub async fn update_buy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BuyInput>,
) -> ApiResult<buy::Model> {
    let buy = state
        .services
        .seed_movements
        .update_buy(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(buy))
}

pub async fn delete_buy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .seed_movements
        .delete_buy(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}

// Plantings

pub async fn list_plantings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SeedMovementFilter>,
) -> ApiResult<PaginatedResponse<planting::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let plantings = state
        .services
        .seed_movements
        .list_plantings(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(plantings))
}

pub async fn get_planting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<planting::Model> {
    Ok(success_response(
        state
            .services
            .seed_movements
            .get_planting(user.tenant_id, id)
            .await?,
    ))
}

pub async fn create_planting(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlantingInput>,
) -> Created<planting::Model> {
    let planting = state
        .services
        .seed_movements
        .create_planting(user.tenant_id, payload)
        .await?;
    Ok(created_response(planting))
}

pub async fn update_planting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlantingInput>,
) -> ApiResult<planting::Model> {
    let planting = state
        .services
        .seed_movements
        .update_planting(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(planting))
}

pub async fn delete_planting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .seed_movements
        .delete_planting(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}

// Harvests

pub async fn list_harvests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SeedMovementFilter>,
) -> ApiResult<PaginatedResponse<harvest::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let harvests = state
        .services
        .seed_movements
        .list_harvests(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(harvests))
}

pub async fn get_harvest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<harvest::Model> {
    Ok(success_response(
        state
            .services
            .seed_movements
            .get_harvest(user.tenant_id, id)
            .await?,
    ))
}

pub async fn create_harvest(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<HarvestInput>,
) -> Created<harvest::Model> {
    let harvest = state
        .services
        .seed_movements
        .create_harvest(user.tenant_id, payload)
        .await?;
    Ok(created_response(harvest))
}

pub async fn update_harvest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<HarvestInput>,
) -> ApiResult<harvest::Model> {
    let harvest = state
        .services
        .seed_movements
        .update_harvest(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(harvest))
}

pub async fn delete_harvest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .seed_movements
        .delete_harvest(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}

// Discards

pub async fn list_discards(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SeedMovementFilter>,
) -> ApiResult<PaginatedResponse<discard::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let discards = state
        .services
        .seed_movements
        .list_discards(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(discards))
}

pub async fn get_discard(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<discard::Model> {
    Ok(success_response(
        state
            .services
            .seed_movements
            .get_discard(user.tenant_id, id)
            .await?,
    ))
}

pub async fn create_discard(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DiscardInput>,
) -> Created<discard::Model> {
    let discard = state
        .services
        .seed_movements
        .create_discard(user.tenant_id, payload)
        .await?;
    Ok(created_response(discard))
}

pub async fn update_discard(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiscardInput>,
) -> ApiResult<discard::Model> {
    let discard = state
        .services
        .seed_movements
        .update_discard(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(discard))
}

pub async fn delete_discard(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .seed_movements
        .delete_discard(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
