use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::product,
    services::products::{ProductFilter, ProductInput, ProductStockView},
    ApiResult, PaginatedResponse,
};

pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let products = state
        .services
        .products
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<product::Model> {
    Ok(success_response(
        state.services.products.get(user.tenant_id, id).await?,
    ))
}

/// Stock balance of a product on every farm holding it
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Balances by farm", body = crate::ApiResponse<ProductStockView>),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inputs"
)]
pub async fn get_product_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductStockView> {
    Ok(success_response(
        state.services.products.stock(user.tenant_id, id).await?,
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductInput>,
) -> Created<product::Model> {
    let product = state
        .services
        .products
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductInput>,
) -> ApiResult<product::Model> {
    let product = state
        .services
        .products
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state.services.products.delete(user.tenant_id, id).await?;
    Ok(no_content_response())
}
