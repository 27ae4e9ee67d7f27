use axum::extract::{Json, Path, Query, State};
use uuid::Uuid;

use super::common::{created_response, page_response, success_response, Created, PaginationParams};
use crate::{
    auth::AuthUser,
    handlers::AppState,
    services::users::{CreateUserInput, UpdateUserInput, UserFilter, UserView},
    ApiResult, PaginatedResponse,
};

/// The authenticated principal
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = crate::ApiResponse<UserView>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<UserView> {
    let me = state
        .services
        .users
        .get(user.tenant_id, user.user_id)
        .await?;
    Ok(success_response(me))
}

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<PaginatedResponse<UserView>> {
    let (page, per_page) = paging.resolve(&state.config)?;
    let users = state
        .services
        .users
        .list(user.tenant_id, filter, page, per_page)
        .await?;
    Ok(page_response(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<UserView> {
    Ok(success_response(
        state.services.users.get(user.tenant_id, id).await?,
    ))
}

/// Add a user to the caller's tenant
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = crate::ApiResponse<UserView>),
        (status = 403, description = "Missing users:write"),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserInput>,
) -> Created<UserView> {
    let created = state
        .services
        .users
        .create(user.tenant_id, payload)
        .await?;
    Ok(created_response(created))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserInput>,
) -> ApiResult<UserView> {
    let updated = state
        .services
        .users
        .update(user.tenant_id, user.user_id, id, payload)
        .await?;
    Ok(success_response(updated))
}
