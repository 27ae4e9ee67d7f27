//! Public authentication endpoints. Everything else under `/api/v1` requires a bearer token.

use axum::extract::{Json, State};
use tracing::info;

use super::common::{created_response, success_response, Created};
use crate::{
    auth::{
        AuthError, LoginCredentials, RefreshTokenRequest, RegisterRequest, RegisterResponse,
        TokenPair,
    },
    handlers::AppState,
    ApiResponse,
};

/// Register a tenant together with its first administrator
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Tenant registered", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Created<RegisterResponse> {
    let registered = state.auth.register(payload).await?;
    Ok(created_response(registered))
}

/// Exchange credentials for a token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Token pair", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid credentials or deactivated user")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> Result<Json<ApiResponse<TokenPair>>, AuthError> {
    let tokens = state.auth.login(payload).await?;
    info!("user logged in");
    Ok(success_response(tokens))
}

/// Exchange a refresh token for a new pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token pair", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid refresh token or deactivated user")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AuthError> {
    let tokens = state.auth.refresh_token(&payload.refresh_token).await?;
    Ok(success_response(tokens))
}
