//! Customers, farms, plots and cultivars.

mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::json;

#[tokio::test]
async fn customer_document_is_normalized_and_unique() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "João da Silva", "document": "123.456.789-09", "kind": "client" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["document"], "12345678909");

    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Duplicate", "document": "12345678909", "kind": "supplier" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Too short", "document": "1234", "kind": "client" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_are_filtered_and_paginated() {
    let app = TestApp::new().await;
    app.seed_customer("Alpha Sementes", "11111111111", "client").await;
    app.seed_customer("Beta Insumos", "22222222222", "supplier").await;
    app.seed_customer("Gama Agro", "33333333333", "both").await;

    let (status, body) = app.get("/api/v1/customers?page=1&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/v1/customers?search=beta").await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Beta Insumos");

    let (status, _) = app.get("/api/v1/customers?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plots_cannot_exceed_the_farm_area() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "100").await;
    app.seed_plot(&farm, "Talhão 1", "60").await;

    let (status, _) = app
        .post(
            "/api/v1/plots",
            json!({ "farm_id": farm, "name": "Talhão 2", "area_ha": "50" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.seed_plot(&farm, "Talhão 2", "40").await;

    // Shrinking the farm below its plotted area is rejected too
    let (status, _) = app
        .put(
            &format!("/api/v1/farms/{farm}"),
            json!({ "name": "Fazenda Norte", "total_area_ha": "90" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get(&format!("/api/v1/farms/{farm}/plots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn farm_with_plots_cannot_be_deleted() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Sul", "50").await;
    let plot = app.seed_plot(&farm, "Talhão A", "10").await;

    let (status, _) = app.delete(&format!("/api/v1/farms/{farm}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/api/v1/plots/{plot}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete(&format!("/api/v1/farms/{farm}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/farms/{farm}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn plot_requires_an_existing_farm() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/plots",
            json!({
                "farm_id": uuid::Uuid::new_v4(),
                "name": "Orphan",
                "area_ha": "5",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cultivar_stock_is_not_editable_directly() {
    let app = TestApp::new().await;
    let cultivar = app.seed_cultivar("TMG 7062", "500").await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("500"));

    let (status, _) = app
        .put(
            &format!("/api/v1/cultivars/{cultivar}"),
            json!({ "name": "TMG 7062", "crop": "soybean", "stock": "900" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/v1/cultivars/{cultivar}"),
            json!({ "name": "TMG 7062 IPRO", "crop": "soybean", "min_stock": "200" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "TMG 7062 IPRO");
    assert_eq!(dec(&body["data"]["stock"]), d("500"));
}

#[tokio::test]
async fn unknown_records_are_not_found() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    for uri in [
        format!("/api/v1/customers/{missing}"),
        format!("/api/v1/farms/{missing}"),
        format!("/api/v1/cultivars/{missing}"),
        format!("/api/v1/products/{missing}"),
    ] {
        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["message"].is_string());
    }
}
