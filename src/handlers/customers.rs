use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::customer,
    services::customers::{CustomerFilter, CustomerInput},
    ApiResult, PaginatedResponse,
};

/// List customers and suppliers of the tenant
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(PaginationParams, CustomerFilter),
    responses(
        (status = 200, description = "Customers", body = crate::ApiResponse<PaginatedResponse<customer::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<CustomerFilter>,
) -> ApiResult<PaginatedResponse<customer::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let customers = state
        .services
        .customers
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(customers))
}

/// Get a customer by id
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = crate::ApiResponse<customer::Model>),
        (status = 404, description = "Unknown customer", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.get(user.tenant_id, id).await?;
    Ok(success_response(customer))
}

/// Register a customer or supplier
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = crate::ApiResponse<customer::Model>),
        (status = 400, description = "Invalid document or fields", body = crate::errors::ErrorResponse),
        (status = 409, description = "Document already registered", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CustomerInput>,
) -> Created<customer::Model> {
    let customer = state
        .services
        .customers
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerInput>,
) -> ApiResult<customer::Model> {
    let customer = state
        .services
        .customers
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(customer))
}

/// Delete a customer; rejected while any record references it
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 409, description = "Customer is referenced", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "registry"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.customers.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
