mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::json;

#[tokio::test]
async fn summary_reflects_the_tenant_state() {
    let app = TestApp::new().await;

    let farm = app.seed_farm("Fazenda Norte", "300").await;
    app.seed_plot(&farm, "Talhão 1", "120").await;
    app.seed_plot(&farm, "Talhão 2", "80.5").await;

    let healthy = app.seed_cultivar("BRS 284", "5000").await;
    let low = app.seed_cultivar("TMG 2381", "40").await;
    app.create(
        "/api/v1/cultivars",
        json!({ "name": "M 6410", "crop": "soybean", "stock": "300", "min_stock": "1000" }),
    )
    .await;

    app.create(
        "/api/v1/fuel-tanks",
        json!({ "farm_id": farm, "name": "Diesel", "capacity_liters": "10000", "stock_liters": "2500" }),
    )
    .await;

    let customer = app
        .seed_customer("Sementes Oeste", "44555666000177", "client")
        .await;
    app.create(
        "/api/v1/sales",
        json!({
            "cultivar_id": healthy,
            "customer_id": customer,
            "quantity": "1000",
            "unit_price": "4.00",
            "sale_date": "2024-03-10",
            "payment": "term",
            "due_date": "2020-04-10",
        }),
    )
    .await;
    app.create(
        "/api/v1/sales",
        json!({
            "cultivar_id": healthy,
            "customer_id": customer,
            "quantity": "500",
            "unit_price": "4.00",
            "sale_date": "2024-06-15",
        }),
    )
    .await;

    let (status, body) = app.get("/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let summary = &body["data"];

    assert_eq!(summary["farm_count"], 1);
    assert_eq!(summary["plot_count"], 2);
    assert_eq!(dec(&summary["plotted_area_ha"]), d("200.5"));
    assert_eq!(summary["cultivar_count"], 3);
    assert_eq!(dec(&summary["seed_stock_total"]), d("3840"));

    let low_names: Vec<&str> = summary["low_stock"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(low_names, vec!["M 6410", "TMG 2381"]);
    assert!(summary["low_stock"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == low.as_str() && dec(&c["minimum"]) == d("100")));

    assert_eq!(summary["receivables"]["pending_count"], 1);
    assert_eq!(dec(&summary["receivables"]["overdue_total"]), d("4000"));
    assert_eq!(summary["sales"]["seed_sales_count"], 2);
    assert_eq!(dec(&summary["sales"]["seed_value"]), d("6000"));
    assert_eq!(dec(&summary["fuel_tanks"][0]["level_percent"]), d("25"));

    let (_, body) = app
        .get("/api/v1/dashboard?from=2024-06-01&to=2024-06-30")
        .await;
    assert_eq!(body["data"]["sales"]["seed_sales_count"], 1);
    assert_eq!(dec(&body["data"]["sales"]["seed_quantity"]), d("500"));
}

#[tokio::test]
async fn inverted_period_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .get("/api/v1/dashboard?from=2024-07-01&to=2024-06-01")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
