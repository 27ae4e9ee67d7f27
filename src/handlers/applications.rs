use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, page_response, success_response, Created, Deleted,
    PaginationParams,
};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    models::application,
    services::applications::{ApplicationFilter, ApplicationInput},
    ApiResult, PaginatedResponse,
};

pub async fn list_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<ApplicationFilter>,
) -> ApiResult<PaginatedResponse<application::Model>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let applications = state
        .services
        .applications
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(applications))
}

pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<application::Model> {
    Ok(success_response(
        state.services.applications.get(user.tenant_id, id).await?,
    ))
}

/// Record an input application on a plot, consuming the farm's stock
#[utoipa::path(
    post,
    path = "/api/v1/applications",
    request_body = ApplicationInput,
    responses(
        (status = 201, description = "Application recorded", body = crate::ApiResponse<application::Model>),
        (status = 400, description = "Plot outside the farm", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inputs"
)]
pub async fn create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplicationInput>,
) -> Created<application::Model> {
    let application = state
        .services
        .applications
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(application))
}

pub async fn update_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplicationInput>,
) -> ApiResult<application::Model> {
    let application = state
        .services
        .applications
        .update(user.tenant_id, id, payload)
        .await?;
    Ok(success_response(application))
}

pub async fn delete_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Deleted {
    state
        .services
        .applications
        .delete(user.tenant_id, id)
        .await?;
    Ok(no_content_response())
}
