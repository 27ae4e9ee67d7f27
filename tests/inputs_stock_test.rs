//! Input stock per farm: purchases add, transfers move, applications consume.

mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::{json, Value};

struct Inputs {
    product: String,
    supplier: String,
    north: String,
    south: String,
    plot: String,
}

async fn seed(app: &TestApp) -> Inputs {
    let product = app.seed_product("Cloreto de Potássio").await;
    let supplier = app
        .seed_customer("Agro Insumos Ltda", "98765432000110", "supplier")
        .await;
    let north = app.seed_farm("Fazenda Norte", "300").await;
    let south = app.seed_farm("Fazenda Sul", "200").await;
    let plot = app.seed_plot(&north, "Talhão 3", "80").await;
    Inputs {
        product,
        supplier,
        north,
        south,
        plot,
    }
}

fn purchase(inputs: &Inputs, quantity: &str) -> Value {
    json!({
        "product_id": inputs.product,
        "farm_id": inputs.north,
        "supplier_id": inputs.supplier,
        "quantity": quantity,
        "unit_price": "3.50",
        "purchase_date": "2024-08-10",
        "invoice_number": "NF-1001",
        "payment": "term",
        "due_date": "2024-09-10",
    })
}

async fn farm_balance(app: &TestApp, product: &str, farm: &str) -> rust_decimal::Decimal {
    let (status, body) = app.get(&format!("/api/v1/products/{product}/stock")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["farms"]
        .as_array()
        .unwrap()
        .iter()
        .find(|balance| balance["farm_id"] == farm)
        .map(|balance| dec(&balance["quantity"]))
        .unwrap_or_default()
}

#[tokio::test]
async fn purchase_adds_stock_and_opens_a_payable() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;

    let (status, body) = app.post("/api/v1/purchases", purchase(&inputs, "1000")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&body["data"]["total_value"]), d("3500"));
    let purchase_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("1000"));

    let (_, body) = app.get("/api/v1/payables").await;
    assert_eq!(body["data"]["total"], 1);
    let payable = &body["data"]["items"][0];
    assert_eq!(payable["purchase_id"], purchase_id.as_str());
    assert_eq!(dec(&payable["amount"]), d("3500"));
    assert_eq!(payable["status"], "pending");

    // Generated payables follow their purchase and cannot be edited directly
    let payable_id = payable["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/v1/payables/{payable_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn purchase_update_and_delete_revert_stock() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;
    let id = app.create("/api/v1/purchases", purchase(&inputs, "1000")).await;

    let (status, body) = app
        .put(&format!("/api/v1/purchases/{id}"), purchase(&inputs, "600"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["data"]["quantity"]), d("600"));
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("600"));

    let (status, _) = app.delete(&format!("/api/v1/purchases/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("0"));

    let (_, body) = app.get("/api/v1/payables").await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn transfer_moves_stock_between_farms() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;
    app.create("/api/v1/purchases", purchase(&inputs, "1000")).await;

    let transfer = json!({
        "product_id": inputs.product,
        "origin_farm_id": inputs.north,
        "destination_farm_id": inputs.south,
        "quantity": "400",
        "transfer_date": "2024-08-15",
    });
    let id = app.create("/api/v1/transfers", transfer).await;

    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("600"));
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.south).await, d("400"));

    let (status, _) = app
        .post(
            "/api/v1/transfers",
            json!({
                "product_id": inputs.product,
                "origin_farm_id": inputs.south,
                "destination_farm_id": inputs.north,
                "quantity": "500",
                "transfer_date": "2024-08-16",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.delete(&format!("/api/v1/transfers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("1000"));
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.south).await, d("0"));
}

#[tokio::test]
async fn transfer_to_the_same_farm_is_invalid() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;

    let (status, _) = app
        .post(
            "/api/v1/transfers",
            json!({
                "product_id": inputs.product,
                "origin_farm_id": inputs.north,
                "destination_farm_id": inputs.north,
                "quantity": "1",
                "transfer_date": "2024-08-15",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn application_consumes_farm_stock() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;
    app.create("/api/v1/purchases", purchase(&inputs, "1000")).await;

    let application = |quantity: &str| {
        json!({
            "product_id": inputs.product,
            "farm_id": inputs.north,
            "plot_id": inputs.plot,
            "quantity": quantity,
            "area_ha": "80",
            "application_date": "2024-10-01",
        })
    };

    let id = app.create("/api/v1/applications", application("250")).await;
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("750"));

    let (status, body) = app.post("/api/v1/applications", application("800")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("750"));

    let (status, _) = app
        .put(&format!("/api/v1/applications/{id}"), application("1000"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("0"));

    // Consumed stock keeps the purchase from being removed
    let (_, body) = app.get("/api/v1/purchases").await;
    let purchase_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = app.delete(&format!("/api/v1/purchases/{purchase_id}")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn product_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;
    app.create("/api/v1/purchases", purchase(&inputs, "10")).await;

    let (status, _) = app.delete(&format!("/api/v1/products/{}", inputs.product)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let unused = app.seed_product("Glifosato").await;
    let (status, _) = app.delete(&format!("/api/v1/products/{unused}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn transfer_update_moves_the_new_quantity() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;
    app.create("/api/v1/purchases", purchase(&inputs, "1000")).await;

    let transfer = |quantity: &str| {
        json!({
            "product_id": inputs.product,
            "origin_farm_id": inputs.north,
            "destination_farm_id": inputs.south,
            "quantity": quantity,
            "transfer_date": "2024-08-15",
        })
    };
    let id = app.create("/api/v1/transfers", transfer("400")).await;

    let (status, body) = app
        .put(&format!("/api/v1/transfers/{id}"), transfer("700"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("300"));
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.south).await, d("700"));

    // More than the origin ever held leaves both balances untouched
    let (status, _) = app
        .put(&format!("/api/v1/transfers/{id}"), transfer("1100"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("300"));
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.south).await, d("700"));
}

#[tokio::test]
async fn out_of_range_amounts_are_rejected() {
    let app = TestApp::new().await;
    let inputs = seed(&app).await;

    let mut body = purchase(&inputs, "2");
    body["unit_price"] = json!("79228162514264337593543950335");
    let (status, _) = app.post("/api/v1/purchases", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/v1/purchases").await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(farm_balance(&app, &inputs.product, &inputs.north).await, d("0"));
}
