use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::{farm, plot},
    services::farms::{FarmFilter, FarmInput, PlotFilter, PlotInput},
    ApiResult, PaginatedResponse,
};

/// List farms
#[utoipa::path(
    get,
    path = "/api/v1/farms",
    params(PaginationParams, FarmFilter),
    responses(
        (status = 200, description = "Farms", body = crate::ApiResponse<PaginatedResponse<farm::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn list_farms(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<FarmFilter>,
) -> ApiResult<PaginatedResponse<farm::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let farms = state
        .services
        .farms
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(farms))
}

pub async fn get_farm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<farm::Model> {
    Ok(success_response(
        state.services.farms.get(user.tenant_id, id).await?,
    ))
}

/// Plots of one farm, unpaginated
pub async fn list_farm_plots(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<plot::Model>> {
    let plots = state
        .services
        .farms
        .plots_of_farm(user.tenant_id, id)
        .await?;
    Ok(success_response(plots))
}

/// Create a farm
#[utoipa::path(
    post,
    path = "/api/v1/farms",
    request_body = FarmInput,
    responses(
        (status = 201, description = "Farm created", body = crate::ApiResponse<farm::Model>),
        (status = 400, description = "Invalid fields", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn create_farm(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FarmInput>,
) -> Created<farm::Model> {
    let farm = state.services.farms.create(user.tenant_id, payload).await?;
    Ok(created_response(farm))
}

pub async fn update_farm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FarmInput>,
) -> ApiResult<farm::Model> {
    let farm = state
        .services
        .farms
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(farm))
}

pub async fn delete_farm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.farms.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}

// Plots

pub async fn list_plots(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<PlotFilter>,
) -> ApiResult<PaginatedResponse<plot::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let plots = state
        .services
        .farms
        .list_plots(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(plots))
}

pub async fn get_plot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<plot::Model> {
    Ok(success_response(
        state.services.farms.get_plot(user.tenant_id, id).await?,
    ))
}

/// Create a plot; the farm's plotted area may not exceed its total area
#[utoipa::path(
    post,
    path = "/api/v1/plots",
    request_body = PlotInput,
    responses(
        (status = 201, description = "Plot created", body = crate::ApiResponse<plot::Model>),
        (status = 400, description = "Area does not fit the farm", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn create_plot(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlotInput>,
) -> Created<plot::Model> {
    let plot = state
        .services
        .farms
        .create_plot(user.tenant_id, payload)
        .await?;
    Ok(created_response(plot))
}

pub async fn update_plot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlotInput>,
) -> ApiResult<plot::Model> {
    let plot = state
        .services
        .farms
        .update_plot(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(plot))
}

pub async fn delete_plot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.farms.delete_plot(user.tenant_id, id).await?;
    Ok(no_content_response())
}
