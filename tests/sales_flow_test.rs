//! Seed sales against contracts, the receivables they generate and their settlement.

mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::{json, Value};

struct Fixture {
    cultivar: String,
    customer: String,
    contract: String,
    item: String,
}

async fn fixture(app: &TestApp) -> Fixture {
    let cultivar = app.seed_cultivar("NS 5959 IPRO", "1000").await;
    let customer = app
        .seed_customer("Sementes Paraná", "11222333000181", "client")
        .await;

    let (status, body) = app
        .post(
            "/api/v1/sale-contracts",
            json!({
                "customer_id": customer,
                "contract_number": "CT-2024-07",
                "signed_date": "2024-07-01",
                "items": [{ "cultivar_id": cultivar, "quantity": "600", "unit_price": "4.20" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(dec(&body["data"]["total_value"]), d("2520"));

    Fixture {
        contract: body["data"]["id"].as_str().unwrap().to_string(),
        item: body["data"]["items"][0]["id"].as_str().unwrap().to_string(),
        cultivar,
        customer,
    }
}

fn sale(fx: &Fixture, quantity: &str, payment: &str) -> Value {
    let mut body = json!({
        "cultivar_id": fx.cultivar,
        "customer_id": fx.customer,
        "contract_item_id": fx.item,
        "quantity": quantity,
        "unit_price": "4.20",
        "sale_date": "2024-08-20",
        "invoice_number": "NF-2001",
        "payment": payment,
    });
    if payment == "term" {
        body["due_date"] = json!("2024-09-20");
    }
    body
}

async fn contract(app: &TestApp, id: &str) -> Value {
    let (status, body) = app.get(&format!("/api/v1/sale-contracts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

#[tokio::test]
async fn sale_draws_stock_and_fulfils_the_contract() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let (status, body) = app.post("/api/v1/sales", sale(&fx, "400", "cash")).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(dec(&body["data"]["total_value"]), d("1680"));
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("600"));

    let view = contract(&app, &fx.contract).await;
    assert_eq!(dec(&view["fulfilled_quantity"]), d("400"));
    assert_eq!(dec(&view["remaining_quantity"]), d("200"));

    // Cash sales generate no receivable
    let (_, body) = app.get("/api/v1/receivables").await;
    assert_eq!(body["data"]["total"], 0);

    // Over-delivery is refused and leaves stock untouched
    let (status, _) = app.post("/api/v1/sales", sale(&fx, "300", "cash")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("600"));

    let (status, _) = app.post("/api/v1/sales", sale(&fx, "200", "cash")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contract(&app, &fx.contract).await["status"], "completed");
}

#[tokio::test]
async fn deleting_a_delivery_reopens_a_completed_contract() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let id = app.create("/api/v1/sales", sale(&fx, "600", "cash")).await;
    assert_eq!(contract(&app, &fx.contract).await["status"], "completed");

    let (status, _) = app.delete(&format!("/api/v1/sales/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let view = contract(&app, &fx.contract).await;
    assert_eq!(view["status"], "active");
    assert_eq!(dec(&view["fulfilled_quantity"]), d("0"));
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("1000"));
}

#[tokio::test]
async fn sale_beyond_stock_is_unprocessable() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let mut body = sale(&fx, "1500", "cash");
    body["contract_item_id"] = Value::Null;
    let (status, response) = app.post("/api/v1/sales", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["message"].is_string());
}

#[tokio::test]
async fn contract_of_another_customer_is_rejected() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;
    let other = app
        .seed_customer("Outro Cliente", "99888777000166", "client")
        .await;

    let mut body = sale(&fx, "100", "cash");
    body["customer_id"] = json!(other);
    let (status, _) = app.post("/api/v1/sales", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paid_receivable_locks_the_sale_until_reopened() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let sale_id = app.create("/api/v1/sales", sale(&fx, "100", "term")).await;

    let (_, body) = app.get("/api/v1/receivables?status=pending").await;
    assert_eq!(body["data"]["total"], 1);
    let receivable = body["data"]["items"][0].clone();
    assert_eq!(receivable["sale_exit_id"], sale_id.as_str());
    assert_eq!(dec(&receivable["amount"]), d("420"));
    let receivable_id = receivable["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/v1/receivables/{receivable_id}/pay"),
            json!({ "paid_at": "2024-09-18" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");
    assert_eq!(body["data"]["paid_at"], "2024-09-18");

    // Paying twice is a conflict
    let (status, _) = app
        .post(&format!("/api/v1/receivables/{receivable_id}/pay"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .put(&format!("/api/v1/sales/{sale_id}"), sale(&fx, "150", "term"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/v1/sales/{sale_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("900"));

    let (status, body) = app
        .post(
            &format!("/api/v1/receivables/{receivable_id}/reopen"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["paid_at"].is_null());

    let (status, body) = app
        .put(&format!("/api/v1/sales/{sale_id}"), sale(&fx, "150", "term"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("850"));

    // The receivable was recreated with the new total
    let (_, body) = app.get("/api/v1/receivables").await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(dec(&body["data"]["items"][0]["amount"]), d("630"));
}

#[tokio::test]
async fn term_sale_requires_a_due_date() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let mut body = sale(&fx, "100", "term");
    body["due_date"] = Value::Null;
    let (status, _) = app.post("/api/v1/sales", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_contract_takes_no_deliveries() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let (status, body) = app
        .post(&format!("/api/v1/sale-contracts/{}/cancel", fx.contract), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = app.post("/api/v1/sales", sale(&fx, "10", "cash")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&format!("/api/v1/sale-contracts/{}/cancel", fx.contract), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn contract_item_cannot_drop_below_delivered() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;
    app.create("/api/v1/sales", sale(&fx, "400", "cash")).await;

    let uri = format!("/api/v1/sale-contracts/{}/items/{}", fx.contract, fx.item);
    let (status, _) = app
        .put(&uri, json!({ "quantity": "300", "unit_price": "4.20" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .put(&uri, json!({ "quantity": "400", "unit_price": "4.50" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    // A contract with deliveries cannot be deleted
    let (status, _) = app
        .delete(&format!("/api/v1/sale-contracts/{}", fx.contract))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn industry_sale_applies_discount_and_receivable() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/industry-sales",
            json!({
                "cultivar_id": fx.cultivar,
                "customer_id": fx.customer,
                "quantity": "200",
                "unit_price": "2.00",
                "discount_percent": "10",
                "sale_date": "2024-08-25",
                "payment": "term",
                "due_date": "2024-09-25",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(dec(&body["data"]["total_value"]), d("360"));
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("800"));

    let industry_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = app.get("/api/v1/receivables").await;
    assert_eq!(body["data"]["items"][0]["industry_sale_id"], industry_id.as_str());

    let (status, _) = app
        .post(
            "/api/v1/industry-sales",
            json!({
                "cultivar_id": fx.cultivar,
                "customer_id": fx.customer,
                "quantity": "1",
                "unit_price": "2.00",
                "discount_percent": "120",
                "sale_date": "2024-08-25",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_receivable_lifecycle() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let id = app
        .create(
            "/api/v1/receivables",
            json!({
                "counterparty_id": fx.customer,
                "description": "Armazenagem de sementes",
                "amount": "800.00",
                "due_date": "2020-01-10",
            }),
        )
        .await;

    let (_, body) = app.get("/api/v1/receivables?overdue=true").await;
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app
        .put(
            &format!("/api/v1/receivables/{id}"),
            json!({
                "counterparty_id": fx.customer,
                "description": "Armazenagem de sementes (ajuste)",
                "amount": "850.00",
                "due_date": "2030-01-10",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["data"]["amount"]), d("850"));

    let (status, _) = app
        .post(&format!("/api/v1/receivables/{id}/pay"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/v1/receivables/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.post(&format!("/api/v1/receivables/{id}/reopen"), json!({}))
        .await;
    let (status, _) = app.delete(&format!("/api/v1/receivables/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn industry_sale_with_out_of_range_price_is_rejected() {
    let app = TestApp::new().await;
    let fx = fixture(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/industry-sales",
            json!({
                "cultivar_id": fx.cultivar,
                "customer_id": fx.customer,
                "quantity": "1",
                "unit_price": "79228162514264337593543950335",
                "discount_percent": "50",
                "sale_date": "2024-08-25",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(app.cultivar_stock(&fx.cultivar).await, d("1000"));
}
