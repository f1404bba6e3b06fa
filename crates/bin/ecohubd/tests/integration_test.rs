//! End-to-end smoke tests for the full ecohubd stack.
//!
//! Each test spins up the complete application (in-memory repos, real
//! services, the Nobø integration against the demo hub, real axum router) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot`, so no TCP port is
//! bound.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ecohub_adapter_http_axum::router;
use ecohub_adapter_http_axum::state::AppState;
use ecohub_adapter_nobo::{NoboConfig, NoboIntegration, SimulatedHub, WeekProfileConfig};
use ecohub_adapter_storage_memory::{MemoryDeviceRepository, MemoryEntityRepository};
use ecohub_app::event_bus::InProcessEventBus;
use ecohub_app::ports::Integration;
use ecohub_app::services::device_service::DeviceService;
use ecohub_app::services::entity_service::EntityService;
use ecohub_app::services::integration_context::ServiceContext;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const SERIAL: &str = "102000012345";

/// Build a fully-wired router on top of the demo hub. Only the living room
/// has an "on" profile, so it is the only zone that can be turned off.
async fn app() -> (Router, Arc<SimulatedHub>) {
    let entity_service = Arc::new(EntityService::new(
        MemoryEntityRepository::new(),
        InProcessEventBus::new(256),
    ));
    let device_service = Arc::new(DeviceService::new(MemoryDeviceRepository::new()));
    let ctx = ServiceContext::new(Arc::clone(&device_service), Arc::clone(&entity_service));

    let hub = Arc::new(SimulatedHub::demo(SERIAL));
    let config = NoboConfig {
        profile_switch_settle_ms: 0,
        week_profiles: WeekProfileConfig {
            off: Some("Off".to_string()),
            on: BTreeMap::from([("Living room".to_string(), "Default".to_string())]),
        },
        ..NoboConfig::default()
    };
    let mut nobo = NoboIntegration::new(Arc::clone(&hub), config);
    nobo.setup(&ctx).await.expect("setup should succeed");
    nobo.start_background(ctx)
        .await
        .expect("update task should start");

    let state = AppState::from_arcs(entity_service, device_service, Arc::new(nobo));
    (router::build(state), hub)
}

async fn send(router: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, Value::Null).await
}

async fn call(router: &Router, entity: &Value, service: &str, data: Value) -> (StatusCode, Value) {
    let uri = format!("/api/entities/{}/services/{service}", entity["id"].as_str().unwrap());
    send(router, "POST", &uri, data).await
}

async fn entity(router: &Router, entity_id: &str) -> Value {
    let (status, entities) = get(router, "/api/entities").await;
    assert_eq!(status, StatusCode::OK);
    entities
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["entity_id"] == entity_id)
        .cloned()
        .unwrap_or_else(|| panic!("{entity_id} should be registered"))
}

/// Poll the stored entity until `check` holds; the update task writes
/// asynchronously.
async fn eventually(router: &Router, entity_id: &str, check: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let current = entity(router, entity_id).await;
        if check(&current) {
            return current;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{entity_id} never reached the expected state");
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let (router, _hub) = app().await;
    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_register_hub_and_components_as_devices() {
    let (router, _hub) = app().await;
    let (status, devices) = get(&router, "/api/devices").await;
    assert_eq!(status, StatusCode::OK);

    let devices = devices.as_array().unwrap();
    assert_eq!(devices.len(), 5);
    let hub = devices.iter().find(|d| d["unique_id"] == SERIAL).unwrap();
    assert_eq!(hub["name"], "My Eco Hub");
    assert_eq!(hub["integration"], "nobo_hub");
    assert!(
        devices
            .iter()
            .filter(|d| d["unique_id"] != SERIAL)
            .all(|d| d["via_device_id"] == hub["id"])
    );

    let uri = format!("/api/devices/{}", hub["id"].as_str().unwrap());
    let (status, fetched) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "My Eco Hub");
}

#[tokio::test]
async fn should_expose_zones_and_temperature_sensors_as_entities() {
    let (router, _hub) = app().await;
    let (_, entities) = get(&router, "/api/entities").await;
    let ids: BTreeSet<&str> = entities
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["entity_id"].as_str().unwrap())
        .collect();

    assert_eq!(
        ids,
        BTreeSet::from([
            "climate.nobo_bedroom",
            "climate.nobo_garage",
            "climate.nobo_living_room",
            "sensor.nobo_234001000002",
            "sensor.nobo_234001000004",
        ])
    );
}

#[tokio::test]
async fn should_describe_zone_with_setpoints_and_supported_modes() {
    let (router, _hub) = app().await;

    let living_room = entity(&router, "climate.nobo_living_room").await;
    assert_eq!(living_room["friendly_name"], "Living room");
    assert_eq!(living_room["state"], "auto");
    assert_eq!(living_room["attributes"]["current_temperature"], 21.5);
    assert_eq!(living_room["attributes"]["target_temp_high"], 22.0);
    assert_eq!(living_room["attributes"]["target_temp_low"], 18.0);
    assert_eq!(living_room["attributes"]["hvac_modes"], json!(["off", "heat", "auto"]));

    let bedroom = entity(&router, "climate.nobo_bedroom").await;
    assert_eq!(bedroom["attributes"]["hvac_modes"], json!(["heat", "auto"]));
    assert!(bedroom["attributes"].get("current_temperature").is_none());

    let hallway = entity(&router, "sensor.nobo_234001000004").await;
    assert_eq!(hallway["friendly_name"], "Hallway switch");
    assert_eq!(hallway["state"], "on");
    assert_eq!(hallway["attributes"]["temperature"], 19.0);
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_switch_to_away_preset_and_report_heat() {
    let (router, _hub) = app().await;
    let living_room = entity(&router, "climate.nobo_living_room").await;

    let (status, _) = call(&router, &living_room, "set_preset_mode", json!({"preset_mode": "away"})).await;
    assert_eq!(status, StatusCode::OK);

    let updated = eventually(&router, "climate.nobo_living_room", |e| {
        e["attributes"]["preset_mode"] == "away"
    })
    .await;
    assert_eq!(updated["state"], "heat");
    assert_eq!(updated["id"], living_room["id"]);
}

#[tokio::test]
async fn should_turn_zone_off_and_back_on() {
    let (router, _hub) = app().await;
    let living_room = entity(&router, "climate.nobo_living_room").await;

    let (status, snapshot) = call(&router, &living_room, "turn_off", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["state"], "off");
    eventually(&router, "climate.nobo_living_room", |e| e["state"] == "off").await;

    let (status, _) = call(&router, &living_room, "turn_on", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    eventually(&router, "climate.nobo_living_room", |e| e["state"] == "auto").await;
}

#[tokio::test]
async fn should_reject_off_for_zone_without_off_profile() {
    let (router, _hub) = app().await;
    let bedroom = entity(&router, "climate.nobo_bedroom").await;

    let (status, body) = call(&router, &bedroom, "set_hvac_mode", json!({"hvac_mode": "off"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("off"));
}

#[tokio::test]
async fn should_reject_unsupported_hvac_mode() {
    let (router, _hub) = app().await;
    let living_room = entity(&router, "climate.nobo_living_room").await;

    let (status, body) = call(&router, &living_room, "set_hvac_mode", json!({"hvac_mode": "cool"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cool"));

    let unchanged = entity(&router, "climate.nobo_living_room").await;
    assert_eq!(unchanged["state"], "auto");
}

#[tokio::test]
async fn should_cap_low_setpoint_to_comfort() {
    let (router, _hub) = app().await;
    let living_room = entity(&router, "climate.nobo_living_room").await;

    let (status, _) = call(&router, &living_room, "set_temperature", json!({"target_temp_low": 25})).await;
    assert_eq!(status, StatusCode::OK);

    let updated = eventually(&router, "climate.nobo_living_room", |e| {
        e["attributes"]["target_temp_low"] == 22.0
    })
    .await;
    assert_eq!(updated["attributes"]["target_temp_high"], 22.0);
}

#[tokio::test]
async fn should_reject_service_calls_on_sensors() {
    let (router, _hub) = app().await;
    let sensor = entity(&router, "sensor.nobo_234001000002").await;

    let (status, _) = call(&router, &sensor, "turn_on", Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_entity() {
    let (router, _hub) = app().await;
    let (status, _) = get(&router, "/api/entities/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&router, "/api/entities/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Push updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_follow_temperature_updates_from_hub() {
    let (router, hub) = app().await;

    hub.set_component_temperature(&"234001000004".into(), 17.5);

    eventually(&router, "sensor.nobo_234001000004", |e| {
        e["attributes"]["temperature"] == 17.5
    })
    .await;
}
