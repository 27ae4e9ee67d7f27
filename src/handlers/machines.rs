use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::machine,
    services::machines::{MachineFilter, MachineInput},
    ApiResult, PaginatedResponse,
};

pub async fn list_machines(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<MachineFilter>,
) -> ApiResult<PaginatedResponse<machine::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let machines = state
        .services
        .machines
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(machines))
}

pub async fn get_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<machine::Model> {
    Ok(success_response(
        state.services.machines.get(user.tenant_id, id).await?,
    ))
}

pub async fn create_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MachineInput>,
) -> Created<machine::Model> {
    let machine = state
        .services
        .machines
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(machine))
}

pub async fn update_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MachineInput>,
) -> ApiResult<machine::Model> {
    let machine = state
        .services
        .machines
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(machine))
}

pub async fn delete_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.machines.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
