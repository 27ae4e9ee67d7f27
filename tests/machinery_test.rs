//! Fuel tanks, refuels and machine hour meters.

mod common;

use axum::http::StatusCode;
use common::{d, dec, TestApp};
use serde_json::{json, Value};

async fn tank_stock(app: &TestApp, tank: &str) -> rust_decimal::Decimal {
    let (_, body) = app.get(&format!("/api/v1/fuel-tanks/{tank}")).await;
    dec(&body["data"]["stock_liters"])
}

async fn hour_meter(app: &TestApp, machine: &str) -> rust_decimal::Decimal {
    let (_, body) = app.get(&format!("/api/v1/machines/{machine}")).await;
    dec(&body["data"]["hour_meter"])
}

fn refuel(machine: &str, tank: &str, liters: &str, meter: &str) -> Value {
    json!({
        "machine_id": machine,
        "tank_id": tank,
        "liters": liters,
        "hour_meter": meter,
        "refuel_date": "2024-10-05",
    })
}

#[tokio::test]
async fn tank_supply_respects_capacity() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;

    let (status, _) = app
        .post(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "6000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let tank = app
        .create(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "1000" }),
        )
        .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/fuel-tanks/{tank}/supply"),
            json!({ "liters": "3500" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["data"]["stock_liters"]), d("4500"));

    let (status, _) = app
        .post(
            &format!("/api/v1/fuel-tanks/{tank}/supply"),
            json!({ "liters": "600" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(tank_stock(&app, &tank).await, d("4500"));

    // Capacity may not drop below what the tank holds
    let (status, _) = app
        .put(
            &format!("/api/v1/fuel-tanks/{tank}"),
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "4000" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .put(
            &format!("/api/v1/fuel-tanks/{tank}"),
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "6000", "stock_liters": "10" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refuel_draws_fuel_and_advances_the_meter() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let tank = app
        .create(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "2000" }),
        )
        .await;
    let machine = app.seed_machine("John Deere 6125J", "1200").await;

    let (status, body) = app
        .post("/api/v1/refuels", refuel(&machine, &tank, "150", "1250.5"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&body["data"]["previous_hour_meter"]), d("1200"));
    let refuel_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(tank_stock(&app, &tank).await, d("1850"));
    assert_eq!(hour_meter(&app, &machine).await, d("1250.5"));

    // Meter going backwards
    let (status, _) = app
        .post("/api/v1/refuels", refuel(&machine, &tank, "10", "1100"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // More than the tank holds
    let (status, _) = app
        .post("/api/v1/refuels", refuel(&machine, &tank, "5000", "1300"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(tank_stock(&app, &tank).await, d("1850"));
    assert_eq!(hour_meter(&app, &machine).await, d("1250.5"));

    // Tank with refuels cannot be deleted
    let (status, _) = app.delete(&format!("/api/v1/fuel-tanks/{tank}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/api/v1/refuels/{refuel_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(tank_stock(&app, &tank).await, d("2000"));
    assert_eq!(hour_meter(&app, &machine).await, d("1200"));
}

#[tokio::test]
async fn deleting_an_older_refuel_keeps_the_latest_meter() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let tank = app
        .create(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "2000" }),
        )
        .await;
    let machine = app.seed_machine("Colheitadeira", "500").await;

    let first = app
        .create("/api/v1/refuels", refuel(&machine, &tank, "100", "520"))
        .await;
    app.create("/api/v1/refuels", refuel(&machine, &tank, "100", "540"))
        .await;

    let (status, _) = app.delete(&format!("/api/v1/refuels/{first}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(hour_meter(&app, &machine).await, d("540"));
    assert_eq!(tank_stock(&app, &tank).await, d("1900"));
}

#[tokio::test]
async fn term_maintenance_opens_a_payable() {
    let app = TestApp::new().await;
    let machine = app.seed_machine("Pulverizador", "80").await;
    let workshop = app
        .seed_customer("Oficina Central", "55566677000188", "supplier")
        .await;

    let (status, body) = app
        .post(
            "/api/v1/maintenances",
            json!({
                "machine_id": machine,
                "kind": "corrective",
                "description": "Troca de bicos",
                "maintenance_date": "2024-09-01",
                "cost": "1250.00",
                "supplier_id": workshop,
                "payment": "term",
                "due_date": "2024-10-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let maintenance = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.get("/api/v1/payables").await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["maintenance_id"], maintenance.as_str());

    // Machine with history cannot be deleted
    let (status, _) = app.delete(&format!("/api/v1/machines/{machine}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .delete(&format!("/api/v1/maintenances/{maintenance}"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/api/v1/payables").await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn editing_an_older_refuel_stays_between_its_neighbours() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let tank = app
        .create(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "2000" }),
        )
        .await;
    let machine = app.seed_machine("Plantadeira", "100").await;

    let older = app
        .create("/api/v1/refuels", refuel(&machine, &tank, "50", "110"))
        .await;
    let latest = app
        .create("/api/v1/refuels", refuel(&machine, &tank, "50", "120"))
        .await;

    // Correcting the liters of the older refuel
    let (status, body) = app
        .put(
            &format!("/api/v1/refuels/{older}"),
            refuel(&machine, &tank, "60", "110"),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(dec(&body["data"]["previous_hour_meter"]), d("100"));
    assert_eq!(tank_stock(&app, &tank).await, d("1890"));
    assert_eq!(hour_meter(&app, &machine).await, d("120"));

    let (status, _) = app
        .put(
            &format!("/api/v1/refuels/{older}"),
            refuel(&machine, &tank, "60", "125"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .put(
            &format!("/api/v1/refuels/{older}"),
            refuel(&machine, &tank, "60", "95"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(tank_stock(&app, &tank).await, d("1890"));

    // The latest refuel still moves the machine's meter
    let (status, body) = app
        .put(
            &format!("/api/v1/refuels/{latest}"),
            refuel(&machine, &tank, "50", "130"),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(dec(&body["data"]["previous_hour_meter"]), d("110"));
    assert_eq!(hour_meter(&app, &machine).await, d("130"));

    // Moving the older reading carries over to the next refuel
    let (status, _) = app
        .put(
            &format!("/api/v1/refuels/{older}"),
            refuel(&machine, &tank, "60", "115"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/api/v1/refuels/{latest}")).await;
    assert_eq!(dec(&body["data"]["previous_hour_meter"]), d("115"));
    assert_eq!(hour_meter(&app, &machine).await, d("130"));
}

#[tokio::test]
async fn refuels_sharing_a_reading_keep_the_meter() {
    let app = TestApp::new().await;
    let farm = app.seed_farm("Fazenda Norte", "300").await;
    let tank = app
        .create(
            "/api/v1/fuel-tanks",
            json!({ "farm_id": farm, "name": "Diesel 1", "capacity_liters": "5000", "stock_liters": "2000" }),
        )
        .await;
    let machine = app.seed_machine("Caminhão", "100").await;

    let first = app
        .create("/api/v1/refuels", refuel(&machine, &tank, "40", "110"))
        .await;
    app.create("/api/v1/refuels", refuel(&machine, &tank, "30", "110"))
        .await;

    let (status, _) = app.delete(&format!("/api/v1/refuels/{first}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(hour_meter(&app, &machine).await, d("110"));
    assert_eq!(tank_stock(&app, &tank).await, d("1970"));

    let (status, _) = app
        .post("/api/v1/refuels", refuel(&machine, &tank, "10", "105"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paid_maintenance_is_locked() {
    let app = TestApp::new().await;
    let machine = app.seed_machine("Trator MF 4292", "3200").await;
    let workshop = app
        .seed_customer("Oficina Central", "55566677000188", "supplier")
        .await;
    let service = |cost: &str| {
        json!({
            "machine_id": machine,
            "kind": "preventive",
            "description": "Revisão 3000h",
            "maintenance_date": "2024-09-01",
            "cost": cost,
            "supplier_id": workshop,
            "payment": "term",
            "due_date": "2024-10-01",
        })
    };
    let maintenance = app.create("/api/v1/maintenances", service("900.00")).await;

    let (_, body) = app.get("/api/v1/payables").await;
    let payable = body["data"]["items"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .post(&format!("/api/v1/payables/{payable}/pay"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(&format!("/api/v1/maintenances/{maintenance}"), service("950.00"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .delete(&format!("/api/v1/maintenances/{maintenance}"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get(&format!("/api/v1/maintenances/{maintenance}")).await;
    assert_eq!(dec(&body["data"]["cost"]), d("900"));
}
