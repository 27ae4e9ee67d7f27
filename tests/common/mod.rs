#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use agro_erp::{
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    AppState,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str =
    "integration-test-secret-that-is-long-enough-for-hs256-and-has-many-unique-chars-0123456789";

/// Helper harness for spinning up the full router over an in-memory SQLite database.
///
/// Every harness registers one tenant whose administrator token is used by default.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    pub tenant_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.low_stock_threshold = 100;

        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = agro_erp::build_router(state.clone());

        let mut app = Self {
            router,
            state,
            token: String::new(),
            tenant_id: Uuid::nil(),
            _event_task: event_task,
        };

        let (token, tenant_id) = app.register_tenant("Fazenda Boa Vista", "admin@boavista.test").await;
        app.token = token;
        app.tenant_id = tenant_id;
        app
    }

    /// Access the bearer token for the default admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Registers another tenant, returning its admin access token and id.
    pub async fn register_tenant(&self, tenant_name: &str, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                Some(json!({
                    "tenant_name": tenant_name,
                    "name": "Admin",
                    "email": email,
                    "password": "s3cret-password",
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let data = &body["data"];
        let token = data["tokens"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string();
        let tenant_id = Uuid::parse_str(data["tenant"]["id"].as_str().expect("tenant id"))
            .expect("tenant id is a uuid");
        (token, tenant_id)
    }

    /// Creates a user with `role` in the default tenant and logs them in.
    pub async fn user_token(&self, role: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/users",
                json!({
                    "name": format!("{role} user"),
                    "email": email,
                    "password": "operator-pass",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
        self.login(email, "operator-pass").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, Some(self.token())).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), Some(self.token()))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), Some(self.token()))
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, Some(self.token()))
            .await
    }

    /// POSTs and returns the id of the created record, failing the test otherwise.
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, response) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {response}");
        response["data"]["id"]
            .as_str()
            .expect("created record has an id")
            .to_string()
    }

    // Seed helpers

    pub async fn seed_customer(&self, name: &str, document: &str, kind: &str) -> String {
        self.create(
            "/api/v1/customers",
            json!({ "name": name, "document": document, "kind": kind }),
        )
        .await
    }

    pub async fn seed_farm(&self, name: &str, area: &str) -> String {
        self.create(
            "/api/v1/farms",
            json!({ "name": name, "state": "PR", "total_area_ha": area }),
        )
        .await
    }

    pub async fn seed_plot(&self, farm_id: &str, name: &str, area: &str) -> String {
        self.create(
            "/api/v1/plots",
            json!({ "farm_id": farm_id, "name": name, "area_ha": area }),
        )
        .await
    }

    pub async fn seed_cultivar(&self, name: &str, stock: &str) -> String {
        self.create(
            "/api/v1/cultivars",
            json!({ "name": name, "crop": "soybean", "stock": stock }),
        )
        .await
    }

    pub async fn seed_product(&self, name: &str) -> String {
        self.create(
            "/api/v1/products",
            json!({ "name": name, "category": "fertilizer", "unit": "kg" }),
        )
        .await
    }

    pub async fn seed_machine(&self, name: &str, hour_meter: &str) -> String {
        self.create(
            "/api/v1/machines",
            json!({ "name": name, "kind": "tractor", "hour_meter": hour_meter }),
        )
        .await
    }

    pub async fn cultivar_stock(&self, cultivar_id: &str) -> Decimal {
        let (status, body) = self.get(&format!("/api/v1/cultivars/{cultivar_id}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        dec(&body["data"]["stock"])
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Decimals travel as JSON strings; accepts numbers too.
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).expect("decimal literal")
}
