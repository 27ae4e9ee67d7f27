use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::{industry_sale, sale_exit},
    services::sales::{IndustrySaleInput, SaleExitInput, SaleFilter},
    ApiResult, PaginatedResponse,
};

/// List seed sales
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(PaginationParams, SaleFilter),
    responses(
        (status = 200, description = "Seed sales", body = crate::ApiResponse<PaginatedResponse<sale_exit::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SaleFilter>,
) -> ApiResult<PaginatedResponse<sale_exit::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let sales = state
        .services
        .sales
        .list_exits(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(sales))
}

/// Get a seed sale
#[utoipa::path(
    get,
    path = "/api/v1/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Seed sale", body = crate::ApiResponse<sale_exit::Model>),
        (status = 404, description = "Unknown sale", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<sale_exit::Model> {
    Ok(success_response(
        state.services.sales.get_exit(user.tenant_id, id).await?,
    ))
}

/// Record a seed sale
///
/// Takes the quantity out of the cultivar's stock, fulfils the linked contract item and,
/// for term payments, opens a receivable. Everything happens in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = SaleExitInput,
    responses(
        (status = 201, description = "Sale recorded", body = crate::ApiResponse<sale_exit::Model>),
        (status = 400, description = "Invalid sale", body = crate::errors::ErrorResponse),
        (status = 409, description = "Contract item over-fulfilled or contract not active", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaleExitInput>,
) -> Created<sale_exit::Model> {
    let sale = state
        .services
        .sales
        .create_exit(user.tenant_id, payload)
        .await?;
    Ok(created_response(sale))
}

/// Replace a seed sale; rejected once its receivable is paid
#[utoipa::path(
    put,
    path = "/api/v1/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale id")),
    request_body = SaleExitInput,
    responses(
        (status = 200, description = "Sale updated", body = crate::ApiResponse<sale_exit::Model>),
        (status = 409, description = "Receivable already paid", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn update_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaleExitInput>,
) -> ApiResult<sale_exit::Model> {
    let sale = state
        .services
        .sales
        .update_exit(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(sale))
}

/// Delete a seed sale, returning the seed to stock
#[utoipa::path(
    delete,
    path = "/api/v1/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale id")),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 409, description = "Receivable already paid", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "seeds"
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.sales.delete_exit(user.tenant_id, id).await?;
    Ok(no_content_response())
}

// Industry sales

pub async fn list_industry_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SaleFilter>,
) -> ApiResult<PaginatedResponse<industry_sale::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let sales = state
        .services
        .sales
        .list_industry(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(sales))
}

pub async fn get_industry_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<industry_sale::Model> {
    Ok(success_response(
        state.services.sales.get_industry(user.tenant_id, id).await?,
    ))
}

pub async fn create_industry_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<IndustrySaleInput>,
) -> Created<industry_sale::Model> {
    let sale = state
        .services
        .sales
        .create_industry(user.tenant_id, payload)
        .await?;
    Ok(created_response(sale))
}

pub async fn update_industry_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<IndustrySaleInput>,
) -> ApiResult<industry_sale::Model> {
    let sale = state
        .services
        .sales
        .update_industry(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(sale))
}

pub async fn delete_industry_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .sales
        .delete_industry(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
