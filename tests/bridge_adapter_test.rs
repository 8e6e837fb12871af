// Integration tests for `BridgeAdapter` using wiremock as the bridge.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hue_lights_rs::{BridgeAdapter, MemoryStore, PairingOutcome, PairingState, Storage};

const BRIDGE_ID: &str = "001788fffe123456";

// ── Helpers ─────────────────────────────────────────────────────────

/// A store whose writes always fail.
struct BrokenStore;

impl Storage for BrokenStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, hue_lights_rs::Error> {
        Ok(None)
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<(), hue_lights_rs::Error> {
        Err(hue_lights_rs::Error::store("set_item", "disk full"))
    }
}

fn link_button_error() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([
        { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
    ]))
}

fn one_blue_light() -> serde_json::Value {
    json!({
        "1": {
            "name": "Desk",
            "state": { "on": false, "hue": 43690, "sat": 255, "bri": 255 }
        }
    })
}

/// A server with a stored credential and a mounted lights listing.
async fn paired_setup(
    lights: serde_json::Value,
) -> (MockServer, BridgeAdapter<MemoryStore>) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stored-user/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&lights))
        .mount(&server)
        .await;

    let storage = MemoryStore::new();
    storage
        .set_item(
            "hue.credentials",
            &json!({ BRIDGE_ID: "stored-user" }).to_string(),
        )
        .await
        .unwrap();

    let adapter = BridgeAdapter::new(BRIDGE_ID, &server.uri(), storage).unwrap();
    (server, adapter)
}

async fn registration_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/api")
        .count()
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pairing_stops_at_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(link_button_error())
        .mount(&server)
        .await;

    let adapter = BridgeAdapter::new(BRIDGE_ID, &server.uri(), MemoryStore::new()).unwrap();
    let outcome = adapter.start_pairing(Duration::from_secs(1)).await.unwrap();

    assert_eq!(outcome, PairingOutcome::Expired);
    assert_eq!(adapter.pairing_state(), PairingState::Expired);
    assert!(!adapter.is_paired());

    // Attempts at ~0ms, ~500ms, ~1000ms; none after the deadline.
    let attempts = registration_count(&server).await;
    assert!((2..=3).contains(&attempts), "got {attempts} attempts");
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(registration_count(&server).await, attempts);
}

#[tokio::test]
async fn test_cancel_during_retry_wait_suppresses_next_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(link_button_error())
        .mount(&server)
        .await;

    let adapter =
        Arc::new(BridgeAdapter::new(BRIDGE_ID, &server.uri(), MemoryStore::new()).unwrap());

    let driver = Arc::clone(&adapter);
    let handle = tokio::spawn(async move { driver.start_pairing(Duration::from_secs(10)).await });

    // Land inside the 500ms wait after the first attempt.
    tokio::time::sleep(Duration::from_millis(200)).await;
    adapter.cancel_pairing();

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome, PairingOutcome::Cancelled);
    assert_eq!(adapter.pairing_state(), PairingState::Cancelled);

    assert_eq!(registration_count(&server).await, 1);
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(registration_count(&server).await, 1);
}

#[tokio::test]
async fn test_stored_credential_short_circuits_pairing() {
    let (server, adapter) = paired_setup(one_blue_light()).await;

    let outcome = adapter.start_pairing(Duration::from_secs(1)).await.unwrap();
    assert_eq!(outcome, PairingOutcome::Succeeded("stored-user".to_string()));
    assert_eq!(adapter.pairing_state(), PairingState::Succeeded);

    // No registration request was issued, and discovery already ran.
    assert_eq!(registration_count(&server).await, 0);
    assert_eq!(adapter.light_ids().await, vec!["1".to_string()]);
}

#[tokio::test]
async fn test_successful_pairing_persists_and_discovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "fresh-user" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fresh-user/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_blue_light()))
        .mount(&server)
        .await;

    let adapter = BridgeAdapter::new(BRIDGE_ID, &server.uri(), MemoryStore::new()).unwrap();
    let outcome = adapter.start_pairing(Duration::from_secs(5)).await.unwrap();

    assert_eq!(outcome, PairingOutcome::Succeeded("fresh-user".to_string()));
    assert!(adapter.is_paired());
    assert_eq!(adapter.pairing_state(), PairingState::Succeeded);
    assert_eq!(adapter.light_ids().await.len(), 1);

    // A second start_pairing never contacts the bridge again.
    adapter.start_pairing(Duration::from_secs(1)).await.unwrap();
    assert_eq!(registration_count(&server).await, 1);
}

#[tokio::test]
async fn test_store_write_failure_does_not_undo_pairing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "fresh-user" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fresh-user/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_blue_light()))
        .mount(&server)
        .await;

    // The bridge granted the credential; a failed persist must not
    // force another link button press.
    let adapter = BridgeAdapter::new(BRIDGE_ID, &server.uri(), BrokenStore).unwrap();
    let outcome = adapter.start_pairing(Duration::from_secs(5)).await.unwrap();

    assert_eq!(outcome, PairingOutcome::Succeeded("fresh-user".to_string()));
    assert!(adapter.is_paired());
    assert_eq!(adapter.pairing_state(), PairingState::Succeeded);
    // Discovery still ran with the cached credential.
    assert_eq!(adapter.light_ids().await.len(), 1);
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let lights = json!({
        "1": { "name": "Desk", "state": { "on": true, "hue": 0, "sat": 255, "bri": 255 } },
        "2": { "name": "Hall", "state": { "on": false, "hue": 21845, "sat": 255, "bri": 128 } },
    });
    let (_server, adapter) = paired_setup(lights).await;

    let added = adapter.boot().await.unwrap();
    assert_eq!(added, vec!["1".to_string(), "2".to_string()]);

    // Unchanged listing: second cycle is a no-op for existing ids.
    let added = adapter.discover().await.unwrap();
    assert!(added.is_empty());
    assert_eq!(adapter.light_ids().await.len(), 2);
}

#[tokio::test]
async fn test_discovery_without_credential_is_not_paired() {
    let server = MockServer::start().await;
    let adapter = BridgeAdapter::new(BRIDGE_ID, &server.uri(), MemoryStore::new()).unwrap();

    assert!(adapter.boot().await.unwrap().is_empty());
    let err = adapter.discover().await.unwrap_err();
    assert!(matches!(err, hue_lights_rs::Error::NotPaired(_)));
}

// ── State sync ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_on_change_pushes_full_state() {
    let (server, adapter) = paired_setup(one_blue_light()).await;
    adapter.boot().await.unwrap();

    // The discovery color (#0000ff) is re-encoded even though only the
    // power state changed.
    Mock::given(method("PUT"))
        .and(path("/api/stored-user/lights/1/state"))
        .and(body_json(json!({ "on": true, "hue": 43690, "sat": 255, "bri": 255 })))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    adapter.set_property("1", "on", &json!(true)).await.unwrap();
    assert!(adapter.light("1").await.unwrap().on());
}

#[tokio::test]
async fn test_color_change_pushes_color_only() {
    let (server, adapter) = paired_setup(one_blue_light()).await;
    adapter.boot().await.unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/stored-user/lights/1/state"))
        .and(body_json(json!({ "hue": 0, "sat": 255, "bri": 255 })))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    adapter
        .set_property("1", "color", &json!("#ff0000"))
        .await
        .unwrap();
    assert_eq!(adapter.light("1").await.unwrap().color().as_str(), "#ff0000");
}

#[tokio::test]
async fn test_push_failure_keeps_optimistic_value() {
    let (server, adapter) = paired_setup(one_blue_light()).await;
    adapter.boot().await.unwrap();

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // The push fails, the caller does not, and the cached value stays.
    adapter.set_property("1", "on", &json!(true)).await.unwrap();
    assert!(adapter.light("1").await.unwrap().on());
}

#[tokio::test]
async fn test_unrecognized_property_makes_no_bridge_call() {
    let (server, adapter) = paired_setup(one_blue_light()).await;
    adapter.boot().await.unwrap();

    adapter
        .set_property("1", "colorTemperature", &json!(2700))
        .await
        .unwrap();

    let puts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .count();
    assert_eq!(puts, 0);
}

#[tokio::test]
async fn test_set_property_on_unknown_light_fails() {
    let (_server, adapter) = paired_setup(one_blue_light()).await;
    adapter.boot().await.unwrap();

    let err = adapter
        .set_property("99", "on", &json!(true))
        .await
        .unwrap_err();
    assert!(matches!(err, hue_lights_rs::Error::LightNotFound(_)));
}
