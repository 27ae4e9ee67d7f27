use axum::extract::{Query, State};

use super::common::success_response;
use crate::{
    auth::AuthUser,
    handlers::AppState,
    services::dashboard::{DashboardQuery, DashboardSummary},
    ApiResult,
};

/// Tenant summary: registry counts, stock, open accounts, sales in the period, contracts and fuel
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard summary", body = crate::ApiResponse<DashboardSummary>),
        (status = 400, description = "Period starts after it ends", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardSummary> {
    let summary = state
        .services
        .dashboard
        .summary(user.tenant_id, query)
        .await?;
    Ok(success_response(summary))
}
