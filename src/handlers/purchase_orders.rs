use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    services::purchase_orders::{
        OrderItemUpdate, PurchaseOrderFilter, PurchaseOrderInput, PurchaseOrderView,
        UpdatePurchaseOrderInput,
    },
    ApiResult, PaginatedResponse,
};

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> ApiResult<PaginatedResponse<PurchaseOrderView>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let orders = state
        .services
        .purchase_orders
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(orders))
}

pub async fn get_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderView> {
    Ok(success_response(
        state
            .services
            .purchase_orders
            .get(user.tenant_id, id)
            .await?,
    ))
}

/// Create a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = PurchaseOrderInput,
    responses(
        (status = 201, description = "Purchase order created", body = crate::ApiResponse<PurchaseOrderView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "commercial"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PurchaseOrderInput>,
) -> Created<PurchaseOrderView> {
    let order = state
        .services
        .purchase_orders
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(order))
}

pub async fn update_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderInput>,
) -> ApiResult<PurchaseOrderView> {
    let order = state
        .services
        .purchase_orders
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(order))
}

pub async fn update_purchase_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<OrderItemUpdate>,
) -> ApiResult<PurchaseOrderView> {
    let order = state
        .services
        .purchase_orders
        .update_item(user.tenant_id, id, item_id, payload)
        .await?;
    Ok(success_response(order))
}

pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderView> {
    let order = state
        .services
        .purchase_orders
        .cancel(user.tenant_id, id)
        .await?;
    Ok(success_response(order))
}

pub async fn delete_purchase_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .purchase_orders
        .delete(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
