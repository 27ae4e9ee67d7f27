use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::maintenance,
    services::maintenance::{MaintenanceFilter, MaintenanceInput},
    ApiResult, PaginatedResponse,
};

pub async fn list_maintenances(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<MaintenanceFilter>,
) -> ApiResult<PaginatedResponse<maintenance::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let maintenances = state
        .services
        .maintenance
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(maintenances))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<maintenance::Model> {
    Ok(success_response(
        state.services.maintenance.get(user.tenant_id, id).await?,
    ))
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MaintenanceInput>,
) -> Created<maintenance::Model> {
    let maintenance = state
        .services
        .maintenance
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(maintenance))
}

pub async fn update_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaintenanceInput>,
) -> ApiResult<maintenance::Model> {
    let maintenance = state
        .services
        .maintenance
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(maintenance))
}

pub async fn delete_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .maintenance
        .delete(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
