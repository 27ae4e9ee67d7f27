//! Seed stock movements and purchase orders received through input purchases.

mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::json;

#[tokio::test]
async fn seed_movements_keep_the_cultivar_stock() {
    let app = TestApp::new().await;
    let cultivar = app.seed_cultivar("DM 66i68", "0").await;
    let supplier = app
        .seed_customer("Obtentora Sementes", "10203040000150", "supplier")
        .await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let plot = app.seed_plot(&farm, "Talhão 7", "45").await;

    let buy = app
        .create(
            "/api/v1/buys",
            json!({
                "cultivar_id": cultivar,
                "supplier_id": supplier,
                "quantity": "2000",
                "unit_price": "6.00",
                "buy_date": "2024-09-01",
                "payment": "term",
                "due_date": "2024-12-01",
            }),
        )
        .await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("2000"));

    let (_, body) = app.get("/api/v1/payables").await;
    assert_eq!(body["data"]["items"][0]["buy_id"], buy.as_str());
    assert_eq!(dec(&body["data"]["items"][0]["amount"]), d("12000"));

    let planting = app
        .create(
            "/api/v1/plantings",
            json!({
                "cultivar_id": cultivar,
                "plot_id": plot,
                "season": "2024/25",
                "quantity": "1800",
                "area_ha": "45",
                "planting_date": "2024-10-10",
            }),
        )
        .await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("200"));

    app.create(
        "/api/v1/harvests",
        json!({
            "cultivar_id": cultivar,
            "plot_id": plot,
            "season": "2024/25",
            "quantity": "9000",
            "harvest_date": "2025-02-20",
        }),
    )
    .await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("9200"));

    let (status, _) = app
        .post(
            "/api/v1/discards",
            json!({
                "cultivar_id": cultivar,
                "quantity": "10000",
                "reason": "Germinação baixa",
                "discard_date": "2025-03-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.create(
        "/api/v1/discards",
        json!({
            "cultivar_id": cultivar,
            "quantity": "200",
            "reason": "Germinação baixa",
            "discard_date": "2025-03-01",
        }),
    )
    .await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("9000"));

    let (_, body) = app.get("/api/v1/plantings?season=2024/25").await;
    assert_eq!(body["data"]["total"], 1);

    // Removing the planting gives the seed back
    let (status, _) = app.delete(&format!("/api/v1/plantings/{planting}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.cultivar_stock(&cultivar).await, d("10800"));

    // A cultivar with movements stays
    let (status, _) = app.delete(&format!("/api/v1/cultivars/{cultivar}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn purchases_receive_purchase_order_items() {
    let app = TestApp::new().await;
    let product = app.seed_product("Fungicida X").await;
    let supplier = app
        .seed_customer("Distribuidora Agro", "60708090000120", "supplier")
        .await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;

    let (status, body) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "supplier_id": supplier,
                "order_number": "PO-88",
                "order_date": "2024-07-20",
                "items": [{ "product_id": product, "quantity": "100", "unit_price": "95.00" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "open");
    let order = body["data"]["id"].as_str().unwrap().to_string();
    let item = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "supplier_id": supplier,
                "order_number": "PO-88",
                "order_date": "2024-07-21",
                "items": [{ "product_id": product, "quantity": "1", "unit_price": "1" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let purchase = |quantity: &str| {
        json!({
            "product_id": product,
            "farm_id": farm,
            "supplier_id": supplier,
            "quantity": quantity,
            "unit_price": "95.00",
            "purchase_date": "2024-08-01",
            "purchase_order_item_id": item,
        })
    };

    app.create("/api/v1/purchases", purchase("60")).await;
    let (status, _) = app.post("/api/v1/purchases", purchase("50")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let last = app.create("/api/v1/purchases", purchase("40")).await;
    let (_, body) = app.get(&format!("/api/v1/purchase-orders/{order}")).await;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(dec(&body["data"]["remaining_quantity"]), d("0"));

    let (status, _) = app.delete(&format!("/api/v1/purchases/{last}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get(&format!("/api/v1/purchase-orders/{order}")).await;
    assert_eq!(body["data"]["status"], "open");
    assert_eq!(dec(&body["data"]["fulfilled_quantity"]), d("60"));

    let (status, body) = app
        .post(&format!("/api/v1/purchase-orders/{order}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = app.post("/api/v1/purchases", purchase("10")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn paid_seed_purchase_is_locked() {
    let app = TestApp::new().await;
    let cultivar = app.seed_cultivar("BRS 1003 IPRO", "0").await;
    let supplier = app
        .seed_customer("Obtentora Sementes", "10203040000150", "supplier")
        .await;
    let buy = |quantity: &str| {
        json!({
            "cultivar_id": cultivar,
            "supplier_id": supplier,
            "quantity": quantity,
            "unit_price": "5.00",
            "buy_date": "2024-09-01",
            "payment": "term",
            "due_date": "2024-10-01",
        })
    };
    let id = app.create("/api/v1/buys", buy("1000")).await;

    let (_, body) = app.get("/api/v1/payables").await;
    let payable = body["data"]["items"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .post(&format!("/api/v1/payables/{payable}/pay"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.put(&format!("/api/v1/buys/{id}"), buy("800")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/v1/buys/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.cultivar_stock(&cultivar).await, d("1000"));

    // Reopening the payable unlocks the purchase again
    app.post(&format!("/api/v1/payables/{payable}/reopen"), json!({}))
        .await;
    let (status, _) = app.put(&format!("/api/v1/buys/{id}"), buy("800")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.cultivar_stock(&cultivar).await, d("800"));
}

#[tokio::test]
async fn consumed_seed_keeps_its_sources() {
    let app = TestApp::new().await;
    let cultivar = app.seed_cultivar("TMG 7062", "0").await;
    let supplier = app
        .seed_customer("Obtentora Sementes", "10203040000150", "supplier")
        .await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let plot = app.seed_plot(&farm, "Talhão 2", "60").await;

    let buy = app
        .create(
            "/api/v1/buys",
            json!({
                "cultivar_id": cultivar,
                "supplier_id": supplier,
                "quantity": "500",
                "unit_price": "5.00",
                "buy_date": "2024-09-01",
                "payment": "cash",
            }),
        )
        .await;
    let harvest = app
        .create(
            "/api/v1/harvests",
            json!({
                "cultivar_id": cultivar,
                "plot_id": plot,
                "season": "2023/24",
                "quantity": "300",
                "harvest_date": "2024-09-10",
            }),
        )
        .await;
    app.create(
        "/api/v1/plantings",
        json!({
            "cultivar_id": cultivar,
            "plot_id": plot,
            "season": "2024/25",
            "quantity": "700",
            "planting_date": "2024-10-01",
        }),
    )
    .await;
    assert_eq!(app.cultivar_stock(&cultivar).await, d("100"));

    let (status, _) = app.delete(&format!("/api/v1/harvests/{harvest}")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app.delete(&format!("/api/v1/buys/{buy}")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.cultivar_stock(&cultivar).await, d("100"));
}

#[tokio::test]
async fn order_items_keep_their_submitted_order() {
    let app = TestApp::new().await;
    let supplier = app
        .seed_customer("Distribuidora Agro", "60708090000120", "supplier")
        .await;
    let products = [
        app.seed_product("Ureia").await,
        app.seed_product("Superfosfato Simples").await,
        app.seed_product("Cloreto de Potássio").await,
        app.seed_product("Calcário").await,
    ];

    let items: Vec<_> = products
        .iter()
        .map(|product| json!({ "product_id": product, "quantity": "10", "unit_price": "1.00" }))
        .collect();
    let order = app
        .create(
            "/api/v1/purchase-orders",
            json!({
                "supplier_id": supplier,
                "order_number": "PO-90",
                "order_date": "2024-07-20",
                "items": items,
            }),
        )
        .await;

    let (_, body) = app.get(&format!("/api/v1/purchase-orders/{order}")).await;
    let listed: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["product_id"].as_str().unwrap())
        .collect();
    let expected: Vec<&str> = products.iter().map(String::as_str).collect();
    assert_eq!(listed, expected);
}
