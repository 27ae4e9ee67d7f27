use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    services::sale_contracts::{
        ContractItemUpdate, SaleContractFilter, SaleContractInput, SaleContractView,
        UpdateSaleContractInput,
    },
    ApiResult, PaginatedResponse,
};

pub async fn list_contracts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SaleContractFilter>,
) -> ApiResult<PaginatedResponse<SaleContractView>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let contracts = state
        .services
        .sale_contracts
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(contracts))
}

/// Get a sale contract with per-item fulfillment
#[utoipa::path(
    get,
    path = "/api/v1/sale-contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract", body = crate::ApiResponse<SaleContractView>),
        (status = 404, description = "Unknown contract", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "commercial"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SaleContractView> {
    Ok(success_response(
        state.services.sale_contracts.get(user.tenant_id, id).await?,
    ))
}

/// Create a sale contract with its items
#[utoipa::path(
    post,
    path = "/api/v1/sale-contracts",
    request_body = SaleContractInput,
    responses(
        (status = 201, description = "Contract created", body = crate::ApiResponse<SaleContractView>),
        (status = 400, description = "Invalid contract", body = crate::errors::ErrorResponse),
        (status = 409, description = "Contract number already used", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "commercial"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaleContractInput>,
) -> Created<SaleContractView> {
    let contract = state
        .services
        .sale_contracts
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(contract))
}

pub async fn update_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleContractInput>,
) -> ApiResult<SaleContractView> {
    let contract = state
        .services
        .sale_contracts
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(contract))
}

/// Change an item's quantity or price; quantity may not drop below what was delivered
pub async fn update_contract_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ContractItemUpdate>,
) -> ApiResult<SaleContractView> {
    let contract = state
        .services
        .sale_contracts
        .update_item(user.tenant_id, id, item_id, payload)
        .await?;
    Ok(success_response(contract))
}

pub async fn cancel_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SaleContractView> {
    let contract = state
        .services
        .sale_contracts
        .cancel(user.tenant_id, id)
        .await?;
    Ok(success_response(contract))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .sale_contracts
        .delete(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
