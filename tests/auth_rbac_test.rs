//! Authentication, role permissions and tenant isolation over the HTTP surface.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/customers", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["code"].is_string());

    let (status, _) = app
        .request(Method::GET, "/api/v1/customers", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_registered_admin() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@boavista.test");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_and_refresh_issue_new_tokens() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "ADMIN@boavista.test", "password": "s3cret-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");

    // An access token is not accepted as a refresh token
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": app.token() })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "admin@boavista.test", "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn email_is_unique_across_tenants() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "tenant_name": "Outra Fazenda",
                "name": "Someone",
                "email": "Admin@BoaVista.test",
                "password": "another-password",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn viewer_can_read_but_not_write() {
    let app = TestApp::new().await;
    let viewer = app.user_token("viewer", "viewer@boavista.test").await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/farms", None, Some(&viewer))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/farms",
            Some(json!({ "name": "Nope" })),
            Some(&viewer),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "AUTH_INSUFFICIENT_PERMISSIONS");

    let (status, _) = app
        .request(Method::GET, "/api/v1/users", None, Some(&viewer))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn operator_records_field_work_but_not_registry() {
    let app = TestApp::new().await;
    let operator = app.user_token("operator", "operator@boavista.test").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/machines",
            Some(json!({ "name": "Tractor 2", "kind": "tractor" })),
            Some(&operator),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/cultivars",
            Some(json!({ "name": "BRS 1010", "crop": "soybean" })),
            Some(&operator),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::GET, "/api/v1/receivables", None, Some(&operator))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenants_cannot_see_each_other() {
    let app = TestApp::new().await;
    let customer_id = app
        .seed_customer("Cooperativa Sul", "12.345.678/0001-90", "client")
        .await;

    let (other_token, _) = app
        .register_tenant("Fazenda Vizinha", "admin@vizinha.test")
        .await;

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/customers/{customer_id}"),
            None,
            Some(&other_token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(Method::GET, "/api/v1/customers", None, Some(&other_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    // The same document is free in another tenant
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": "Cooperativa", "document": "12345678000190", "kind": "client" })),
            Some(&other_token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn deactivated_users_cannot_log_in() {
    let app = TestApp::new().await;
    app.user_token("manager", "manager@boavista.test").await;

    let (_, body) = app.get("/api/v1/users?role=manager").await;
    let manager_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/api/v1/users/{manager_id}"),
            json!({ "name": "Manager", "role": "manager", "active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "manager@boavista.test", "password": "operator-pass" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_cannot_deactivate_themself() {
    let app = TestApp::new().await;
    let (_, me) = app.get("/api/v1/me").await;
    let my_id = me["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(
            &format!("/api/v1/users/{my_id}"),
            json!({ "name": "Admin", "role": "admin", "active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_docs_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Agro ERP API");
}
