use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::purchase,
    services::purchases::{PurchaseFilter, PurchaseInput},
    ApiResult, PaginatedResponse,
};

pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<PurchaseFilter>,
) -> ApiResult<PaginatedResponse<purchase::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let purchases = state
        .services
        .purchases
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(purchases))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<purchase::Model> {
    Ok(success_response(
        state.services.purchases.get(user.tenant_id, id).await?,
    ))
}

/// Record an input purchase
///
/// Adds the quantity to the farm's stock, fulfils the linked purchase order item and,
/// for term payments, opens a payable.
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    request_body = PurchaseInput,
    responses(
        (status = 201, description = "Purchase recorded", body = crate::ApiResponse<purchase::Model>),
        (status = 400, description = "Invalid purchase", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order item over-fulfilled or order not open", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inputs"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PurchaseInput>,
) -> Created<purchase::Model> {
    let purchase = state
        .services
        .purchases
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(purchase))
}

pub async fn update_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseInput>,
) -> ApiResult<purchase::Model> {
    let purchase = state
        .services
        .purchases
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(purchase))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.purchases.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
