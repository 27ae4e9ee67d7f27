use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::{account_payable, account_receivable},
    services::finance::{AccountFilter, AccountInput, PayAccountInput},
    ApiResult, PaginatedResponse,
};

// Receivables

/// List accounts receivable
#[utoipa::path(
    get,
    path = "/api/v1/receivables",
    params(PaginationParams, AccountFilter),
    responses(
        (status = 200, description = "Receivables", body = crate::ApiResponse<PaginatedResponse<account_receivable::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "finance"
)]
pub async fn list_receivables(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<PaginatedResponse<account_receivable::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let receivables = state
        .services
        .finance
        .list_receivables(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(receivables))
}

pub async fn get_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<account_receivable::Model> {
    Ok(success_response(
        state
            .services
            .finance
            .get_receivable(user.tenant_id, id)
            .await?,
    ))
}

pub async fn create_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AccountInput>,
) -> Created<account_receivable::Model> {
    let receivable = state
        .services
        .finance
        .create_receivable(user.tenant_id, payload)
        .await?;
    Ok(created_response(receivable))
}

pub async fn update_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountInput>,
) -> ApiResult<account_receivable::Model> {
    let receivable = state
        .services
        .finance
        .update_receivable(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(receivable))
}

pub async fn delete_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .finance
        .delete_receivable(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}

/// Settle a receivable
#[utoipa::path(
    post,
    path = "/api/v1/receivables/{id}/pay",
    params(("id" = Uuid, Path, description = "Receivable id")),
    request_body = PayAccountInput,
    responses(
        (status = 200, description = "Receivable paid", body = crate::ApiResponse<account_receivable::Model>),
        (status = 409, description = "Already paid", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "finance"
)]
pub async fn pay_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<PayAccountInput>>,
) -> ApiResult<account_receivable::Model> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    let receivable = state
        .services
        .finance
        .pay_receivable(user.tenant_id, id, input)
        .await?;
    Ok(success_response(receivable))
}

pub async fn reopen_receivable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<account_receivable::Model> {
    let receivable = state
        .services
        .finance
        .reopen_receivable(user.tenant_id, id)
        .await?;
    Ok(success_response(receivable))
}

// Payables

pub async fn list_payables(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<PaginatedResponse<account_payable::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let payables = state
        .services
        .finance
        .list_payables(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(payables))
}

pub async fn get_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<account_payable::Model> {
    Ok(success_response(
        state
            .services
            .finance
            .get_payable(user.tenant_id, id)
            .await?,
    ))
}

pub async fn create_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AccountInput>,
) -> Created<account_payable::Model> {
    let payable = state
        .services
        .finance
        .create_payable(user.tenant_id, payload)
        .await?;
    Ok(created_response(payable))
}

pub async fn update_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountInput>,
) -> ApiResult<account_payable::Model> {
    let payable = state
        .services
        .finance
        .update_payable(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(payable))
}

pub async fn delete_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .finance
        .delete_payable(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}

pub async fn pay_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<PayAccountInput>>,
) -> ApiResult<account_payable::Model> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    let payable = state
        .services
        .finance
        .pay_payable(user.tenant_id, id, input)
        .await?;
    Ok(success_response(payable))
}

pub async fn reopen_payable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<account_payable::Model> {
    let payable = state
        .services
        .finance
        .reopen_payable(user.tenant_id, id)
        .await?;
    Ok(success_response(payable))
}
