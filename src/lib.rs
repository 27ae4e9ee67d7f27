//! Agro ERP API Library
//!
//! Multi-tenant back office for seed-producing farms: registry, inputs, machinery,
//! seed stock, commercial documents and finance, served as a JSON REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
};
use utoipa::ToSchema;

use crate::auth::{consts as perm, AuthRouterExt, AuthService};
use crate::handlers::{
    applications, auth as auth_handlers, cultivars, customers, dashboard, farms, finance, fuel,
    machines, maintenance, products, purchase_orders, purchases, sale_contracts, sales, seeds,
    transfers, users,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Builds the services and the auth service over one database handle.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);
        let auth = Arc::new(AuthService::new(
            auth::AuthConfig::from_app_config(&config),
            db.clone(),
            event_sender.clone(),
        ));
        Self {
            db,
            config,
            event_sender,
            services,
            auth,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn validation_errors_carry_messages() {
        let response = ApiResponse::<()>::validation_errors(vec!["missing".into()]);
        assert!(!response.success);
        assert_eq!(response.errors, Some(vec!["missing".to_string()]));
        assert!(response.meta.is_some_and(|m| m.request_id.is_none()));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ApiError>;

fn registry_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/customers", get(customers::list_customers))
        .route("/customers/:id", get(customers::get_customer))
        .route("/farms", get(farms::list_farms))
        .route("/farms/:id", get(farms::get_farm))
        .route("/farms/:id/plots", get(farms::list_farm_plots))
        .route("/plots", get(farms::list_plots))
        .route("/plots/:id", get(farms::get_plot))
        .route("/cultivars", get(cultivars::list_cultivars))
        .route("/cultivars/:id", get(cultivars::get_cultivar))
        .with_permission(perm::REGISTRY_READ);

    let write = Router::new()
        .route("/customers", post(customers::create_customer))
        .route(
            "/customers/:id",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .route("/farms", post(farms::create_farm))
        .route("/farms/:id", put(farms::update_farm).delete(farms::delete_farm))
        .route("/plots", post(farms::create_plot))
        .route("/plots/:id", put(farms::update_plot).delete(farms::delete_plot))
        .route("/cultivars", post(cultivars::create_cultivar))
        .route(
            "/cultivars/:id",
            put(cultivars::update_cultivar).delete(cultivars::delete_cultivar),
        )
        .with_permission(perm::REGISTRY_WRITE);

    read.merge(write)
}

fn inputs_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/products/:id/stock", get(products::get_product_stock))
        .route("/purchases", get(purchases::list_purchases))
        .route("/purchases/:id", get(purchases::get_purchase))
        .route("/transfers", get(transfers::list_transfers))
        .route("/transfers/:id", get(transfers::get_transfer))
        .route("/applications", get(applications::list_applications))
        .route("/applications/:id", get(applications::get_application))
        .with_permission(perm::INPUTS_READ);

    let write = Router::new()
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/purchases", post(purchases::create_purchase))
        .route(
            "/purchases/:id",
            put(purchases::update_purchase).delete(purchases::delete_purchase),
        )
        .route("/transfers", post(transfers::create_transfer))
        .route(
            "/transfers/:id",
            put(transfers::update_transfer).delete(transfers::delete_transfer),
        )
        .route("/applications", post(applications::create_application))
        .route(
            "/applications/:id",
            put(applications::update_application).delete(applications::delete_application),
        )
        .with_permission(perm::INPUTS_WRITE);

    read.merge(write)
}

fn machinery_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/machines", get(machines::list_machines))
        .route("/machines/:id", get(machines::get_machine))
        .route("/fuel-tanks", get(fuel::list_tanks))
        .route("/fuel-tanks/:id", get(fuel::get_tank))
        .route("/refuels", get(fuel::list_refuels))
        .route("/refuels/:id", get(fuel::get_refuel))
        .route("/maintenances", get(maintenance::list_maintenances))
        .route("/maintenances/:id", get(maintenance::get_maintenance))
        .with_permission(perm::MACHINERY_READ);

    let write = Router::new()
        .route("/machines", post(machines::create_machine))
        .route(
            "/machines/:id",
            put(machines::update_machine).delete(machines::delete_machine),
        )
        .route("/fuel-tanks", post(fuel::create_tank))
        .route("/fuel-tanks/:id", put(fuel::update_tank).delete(fuel::delete_tank))
        .route("/fuel-tanks/:id/supply", post(fuel::supply_tank))
        .route("/refuels", post(fuel::create_refuel))
        .route(
            "/refuels/:id",
            put(fuel::update_refuel).delete(fuel::delete_refuel),
        )
        .route("/maintenances", post(maintenance::create_maintenance))
        .route(
            "/maintenances/:id",
            put(maintenance::update_maintenance).delete(maintenance::delete_maintenance),
        )
        .with_permission(perm::MACHINERY_WRITE);

    read.merge(write)
}

fn seeds_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/buys", get(seeds::list_buys))
        .route("/buys/:id", get(seeds::get_buy))
        .route("/plantings", get(seeds::list_plantings))
        .route("/plantings/:id", get(seeds::get_planting))
        .route("/harvests", get(seeds::list_harvests))
        .route("/harvests/:id", get(seeds::get_harvest))
        .route("/discards", get(seeds::list_discards))
        .route("/discards/:id", get(seeds::get_discard))
        .route("/sales", get(sales::list_sales))
        .route("/sales/:id", get(sales::get_sale))
        .route("/industry-sales", get(sales::list_industry_sales))
        .route("/industry-sales/:id", get(sales::get_industry_sale))
        .with_permission(perm::SEEDS_READ);

    let write = Router::new()
        .route("/buys", post(seeds::create_buy))
        .route("/buys/:id", put(seeds::update_buy).delete(seeds::delete_buy))
        .route("/plantings", post(seeds::create_planting))
        .route(
            "/plantings/:id",
            put(seeds::update_planting).delete(seeds::delete_planting),
        )
        .route("/harvests", post(seeds::create_harvest))
        .route(
            "/harvests/:id",
            put(seeds::update_harvest).delete(seeds::delete_harvest),
        )
        .route("/discards", post(seeds::create_discard))
        .route(
            "/discards/:id",
            put(seeds::update_discard).delete(seeds::delete_discard),
        )
        .route("/sales", post(sales::create_sale))
        .route("/sales/:id", put(sales::update_sale).delete(sales::delete_sale))
        .route("/industry-sales", post(sales::create_industry_sale))
        .route(
            "/industry-sales/:id",
            put(sales::update_industry_sale).delete(sales::delete_industry_sale),
        )
        .with_permission(perm::SEEDS_WRITE);

    read.merge(write)
}

fn commercial_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/sale-contracts", get(sale_contracts::list_contracts))
        .route("/sale-contracts/:id", get(sale_contracts::get_contract))
        .route(
            "/purchase-orders",
            get(purchase_orders::list_purchase_orders),
        )
        .route(
            "/purchase-orders/:id",
            get(purchase_orders::get_purchase_order),
        )
        .with_permission(perm::COMMERCIAL_READ);

    let write = Router::new()
        .route("/sale-contracts", post(sale_contracts::create_contract))
        .route(
            "/sale-contracts/:id",
            put(sale_contracts::update_contract).delete(sale_contracts::delete_contract),
        )
        .route(
            "/sale-contracts/:id/items/:item_id",
            put(sale_contracts::update_contract_item),
        )
        .route(
            "/sale-contracts/:id/cancel",
            post(sale_contracts::cancel_contract),
        )
        .route(
            "/purchase-orders",
            post(purchase_orders::create_purchase_order),
        )
        .route(
            "/purchase-orders/:id",
            put(purchase_orders::update_purchase_order)
                .delete(purchase_orders::delete_purchase_order),
        )
        .route(
            "/purchase-orders/:id/items/:item_id",
            put(purchase_orders::update_purchase_order_item),
        )
        .route(
            "/purchase-orders/:id/cancel",
            post(purchase_orders::cancel_purchase_order),
        )
        .with_permission(perm::COMMERCIAL_WRITE);

    read.merge(write)
}

fn finance_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/receivables", get(finance::list_receivables))
        .route("/receivables/:id", get(finance::get_receivable))
        .route("/payables", get(finance::list_payables))
        .route("/payables/:id", get(finance::get_payable))
        .with_permission(perm::FINANCE_READ);

    let write = Router::new()
        .route("/receivables", post(finance::create_receivable))
        .route(
            "/receivables/:id",
            put(finance::update_receivable).delete(finance::delete_receivable),
        )
        .route("/receivables/:id/pay", post(finance::pay_receivable))
        .route("/receivables/:id/reopen", post(finance::reopen_receivable))
        .route("/payables", post(finance::create_payable))
        .route(
            "/payables/:id",
            put(finance::update_payable).delete(finance::delete_payable),
        )
        .route("/payables/:id/pay", post(finance::pay_payable))
        .route("/payables/:id/reopen", post(finance::reopen_payable))
        .with_permission(perm::FINANCE_WRITE);

    read.merge(write)
}

fn user_routes() -> Router<AppState> {
    let me = Router::new().route("/me", get(users::me)).with_auth();

    let read = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        .with_permission(perm::USERS_READ);

    let write = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/:id", put(users::update_user))
        .with_permission(perm::USERS_WRITE);

    me.merge(read).merge(write)
}

// Versioned API: public auth endpoints plus every permission-gated area
pub fn api_v1_routes() -> Router<AppState> {
    let public_auth = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/refresh", post(auth_handlers::refresh));

    let dashboard = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .with_permission(perm::DASHBOARD_READ);

    Router::new()
        .route("/status", get(api_status))
        .merge(public_auth)
        .merge(user_routes())
        .merge(registry_routes())
        .merge(inputs_routes())
        .merge(machinery_routes())
        .merge(seeds_routes())
        .merge(commercial_routes())
        .merge(finance_routes())
        .merge(dashboard)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "service": "agro-erp",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))))
}

/// CORS from configuration: explicit origins, or permissive in development / when opted in.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(middleware_helpers::REQUEST_ID_HEADER),
            ])
            .allow_credentials(cfg.cors_allow_credentials)
    } else if cfg.should_allow_permissive_cors() {
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("no CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> axum::response::Response {
    req.extensions_mut().insert(auth);
    next.run(req).await
}

/// Full application router: health, `/api/v1`, Swagger UI and the global middleware stack.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::<AppState>::new()
        .route("/", get(|| async { "agro-erp up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .nest_service("/health", health::health_routes(state.db.clone()))
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(axum::middleware::from_fn(
            middleware_helpers::security_headers_middleware,
        ))
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            inject_auth_service,
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
