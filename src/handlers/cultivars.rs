use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::cultivar,
    services::cultivars::{CultivarFilter, CultivarInput},
    ApiResult, PaginatedResponse,
};

/// List cultivars with their current seed stock
#[utoipa::path(
    get,
    path = "/api/v1/cultivars",
    params(PaginationParams, CultivarFilter),
    responses(
        (status = 200, description = "Cultivars", body = crate::ApiResponse<PaginatedResponse<cultivar::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn list_cultivars(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<CultivarFilter>,
) -> ApiResult<PaginatedResponse<cultivar::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let cultivars = state
        .services
        .cultivars
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(cultivars))
}

pub async fn get_cultivar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<cultivar::Model> {
    Ok(success_response(
        state.services.cultivars.get(user.tenant_id, id).await?,
    ))
}

pub async fn create_cultivar(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CultivarInput>,
) -> Created<cultivar::Model> {
    let cultivar = state
        .services
        .cultivars
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(cultivar))
}

/// Update a cultivar. Stock is moved only by seed operations, so `stock` is rejected here.
#[utoipa::path(
    put,
    path = "/api/v1/cultivars/{id}",
    params(("id" = Uuid, Path, description = "Cultivar id")),
    request_body = CultivarInput,
    responses(
        (status = 200, description = "Cultivar updated", body = crate::ApiResponse<cultivar::Model>),
        (status = 400, description = "Stock cannot be edited", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn update_cultivar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CultivarInput>,
) -> ApiResult<cultivar::Model> {
    let cultivar = state
        .services
        .cultivars
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(cultivar))
}

pub async fn delete_cultivar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.cultivars.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
