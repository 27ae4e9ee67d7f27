use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::transfer,
    services::transfers::{TransferFilter, TransferInput},
    ApiResult, PaginatedResponse,
};

pub async fn list_transfers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<TransferFilter>,
) -> ApiResult<PaginatedResponse<transfer::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let transfers = state
        .services
        .transfers
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(transfers))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<transfer::Model> {
    Ok(success_response(
        state.services.transfers.get(user.tenant_id, id).await?,
    ))
}

pub async fn create_transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TransferInput>,
) -> Created<transfer::Model> {
    let transfer = state
        .services
        .transfers
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(transfer))
}

pub async fn update_transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferInput>,
) -> ApiResult<transfer::Model> {
    let transfer = state
        .services
        .transfers
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(transfer))
}

pub async fn delete_transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.transfers.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
