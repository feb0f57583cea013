use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use fleetlink::{AppState, ConsulDiscovery};
use httpmock::prelude::*;
use serde_json::json;

/// Points discovery for `service` at the mock server itself.
fn healthy<'a>(server: &'a MockServer, service: &str) -> httpmock::Mock<'a> {
    let address = server.address().ip().to_string();
    let port = server.address().port();
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/health/service/{}", service))
            .query_param("passing", "true");
        then.status(200).json_body(json!([{
            "Node": {"Address": address},
            "Service": {"ID": "inst", "Service": service, "Address": address, "Port": port}
        }]));
    })
}

async fn spawn_app(registry_url: &str) -> Result<String> {
    let discovery = Arc::new(ConsulDiscovery::with_timeout(
        registry_url,
        Duration::from_secs(1),
    ));
    let state = AppState::new(discovery, Duration::from_secs(1));
    let app = fleetlink::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn detail_assembles_every_related_record() -> Result<()> {
    let server = MockServer::start();
    for service in [
        "reservation-service",
        "vehicle-service",
        "client-service",
        "branch-service",
        "tax-service",
    ] {
        healthy(&server, service);
    }

    server.mock(|when, then| {
        when.method(GET).path("/reservations/9");
        then.status(200).json_body(json!({
            "id": 9, "vehicle_id": 7, "client_id": 3, "succursale_id": 4,
            "start": "2024-02-01", "end": "2024-02-05", "status": "confirmed"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/vehicles/7");
        then.status(200).json_body(json!({"id": 7, "model": "Corolla"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/clients/3");
        then.status(200).json_body(json!({"id": 3, "name": "Ada Tremblay"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/branches/4");
        then.status(200).json_body(json!({"id": 4, "name": "Montréal"}));
    });
    let taxes = server.mock(|when, then| {
        when.method(GET)
            .path("/taxes")
            .query_param("branch_id", "4");
        then.status(200)
            .json_body(json!([{"id": 1, "name": "TPS+TVQ", "rate": 0.14975}]));
    });

    let base = spawn_app(&format!("http://{}", server.address())).await?;
    let response = reqwest::Client::new()
        .get(format!("{}/reservations/9/detail", base))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;

    assert_eq!(body["reservation"]["id"], 9);
    assert_eq!(body["vehicle"]["model"], "Corolla");
    assert_eq!(body["client"]["name"], "Ada Tremblay");
    assert_eq!(body["branch"]["name"], "Montréal");
    assert_eq!(body["taxes"][0]["rate"], 0.14975);
    taxes.assert();
    Ok(())
}

#[tokio::test]
async fn nested_failure_becomes_null_not_an_error() -> Result<()> {
    let server = MockServer::start();
    for service in [
        "reservation-service",
        "vehicle-service",
        "client-service",
        "branch-service",
        "tax-service",
    ] {
        healthy(&server, service);
    }

    server.mock(|when, then| {
        when.method(GET).path("/reservations/9");
        then.status(200)
            .json_body(json!({"id": 9, "vehicle_id": 7, "client_id": 3, "branch_id": 4}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/vehicles/7");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/clients/3");
        then.status(200).json_body(json!({"id": 3, "name": "Ada Tremblay"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/branches/4");
        then.status(200).json_body(json!({"id": 4, "name": "Montréal"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/taxes").query_param("branch_id", "4");
        then.status(200).json_body(json!([]));
    });

    let base = spawn_app(&format!("http://{}", server.address())).await?;
    let response = reqwest::Client::new()
        .get(format!("{}/reservations/9/detail", base))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;

    assert!(body["vehicle"].is_null());
    assert_eq!(body["client"]["name"], "Ada Tremblay");
    assert_eq!(body["branch"]["name"], "Montréal");
    Ok(())
}

#[tokio::test]
async fn unknown_reservation_is_404() -> Result<()> {
    let server = MockServer::start();
    healthy(&server, "reservation-service");
    server.mock(|when, then| {
        when.method(GET).path("/reservations/9");
        then.status(404);
    });

    let base = spawn_app(&format!("http://{}", server.address())).await?;
    let response = reqwest::Client::new()
        .get(format!("{}/reservations/9/detail", base))
        .send()
        .await?;

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("reservation 9"));
    Ok(())
}

#[tokio::test]
async fn absent_references_skip_the_lookups_entirely() -> Result<()> {
    let server = MockServer::start();
    healthy(&server, "reservation-service");
    let vehicle_health = healthy(&server, "vehicle-service");
    let client_health = healthy(&server, "client-service");
    let branch_health = healthy(&server, "branch-service");
    let tax_health = healthy(&server, "tax-service");

    server.mock(|when, then| {
        when.method(GET).path("/reservations/9");
        then.status(200)
            .json_body(json!({"id": 9, "status": "confirmed"}));
    });

    let base = spawn_app(&format!("http://{}", server.address())).await?;
    let response = reqwest::Client::new()
        .get(format!("{}/reservations/9/detail", base))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;

    assert!(body["vehicle"].is_null());
    assert!(body["client"].is_null());
    assert!(body["branch"].is_null());
    assert!(body["taxes"].is_null());

    vehicle_health.assert_hits(0);
    client_health.assert_hits(0);
    branch_health.assert_hits(0);
    tax_health.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn reservation_service_down_is_503() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/health/service/reservation-service")
            .query_param("passing", "true");
        then.status(200).json_body(json!([]));
    });

    let base = spawn_app(&format!("http://{}", server.address())).await?;
    let response = reqwest::Client::new()
        .get(format!("{}/reservations/9/detail", base))
        .send()
        .await?;

    assert_eq!(response.status(), 503);
    Ok(())
}
