// End-to-end tests for Fleet against wiremock fake devices: resolver,
// generation dispatch, probing order, and concurrent collection.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relayctl_core::{
    ComponentType, ConcurrencyGate, CoreError, Device, Fleet, FleetOptions, Generation,
    MemoryComponentCache, SWITCH_POWER_ID_BASE,
};

// ── Fake devices ────────────────────────────────────────────────────

/// A Gen2 plug with a named switch "Kitchen" (id 0, metered) and an
/// unnamed cover (id 1).
async fn gen2_device() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "Shelly.GetDeviceInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": {
                "id": "plug-a", "model": "SNPL-00112EU", "gen": 2,
                "fw_id": "1.14.0", "auth_en": false
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "Shelly.GetConfig" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": {
                "sys": { "device": {} },
                "switch:0": { "id": 0, "name": "Kitchen" },
                "cover:1": { "id": 1, "name": null }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "Shelly.GetStatus" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": {
                "switch:0": {
                    "id": 0, "output": true, "apower": 40.0,
                    "voltage": 230.0, "aenergy": { "total": 1200.0 }
                }
            }
        })))
        .mount(&server)
        .await;

    server
}

/// A Gen1 relay that knows nothing about `/rpc`.
async fn gen1_device() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shelly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "SHSW-1", "mac": "A4CF12F45ABC", "fw": "v1.14.0", "auth": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device": { "type": "SHSW-1" },
            "relays": [ { "name": "Heater" } ],
            "meters": [ { "power": 55.0, "total": 1800.0 } ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "relays": [ { "ison": true } ],
            "meters": [ { "power": 55.0, "total": 1800.0 } ]
        })))
        .mount(&server)
        .await;

    server
}

fn fleet() -> Fleet {
    Fleet::builder()
        .options(FleetOptions {
            timeout: Duration::from_secs(2),
            ..FleetOptions::default()
        })
        .cache(Arc::new(MemoryComponentCache::new()))
        .gate(ConcurrencyGate::isolated(4))
        .build()
}

fn device(name: &str, server: &MockServer, generation: Option<Generation>) -> Device {
    let mut d = Device::new(name, server.uri().parse().unwrap());
    d.generation = generation;
    d
}

fn unreachable_device(name: &str) -> Device {
    // Reserved port with nothing listening.
    Device::new(name, "http://127.0.0.1:9".parse().unwrap())
}

// ── Resolution scenarios ────────────────────────────────────────────

#[tokio::test]
async fn named_switch_resolves_and_numeric_cover_passes_through() {
    let server = gen2_device().await;
    let fleet = fleet();
    let dev = device("a", &server, Some(Generation::Gen2));

    let switch_id = fleet
        .resolve_component(&dev, ComponentType::Switch, "Kitchen")
        .await
        .unwrap();
    assert_eq!(switch_id, 0);

    // Numeric selector: returned unchanged, no validation, no fetch.
    let cover_id = fleet
        .resolve_component(&dev, ComponentType::Cover, "1")
        .await
        .unwrap();
    assert_eq!(cover_id, 1);
}

#[tokio::test]
async fn resolution_is_cached_across_fleet_calls() {
    let server = gen2_device().await;
    let fleet = fleet();
    let dev = device("a", &server, Some(Generation::Gen2));

    fleet
        .resolve_component(&dev, ComponentType::Switch, "Kitchen")
        .await
        .unwrap();

    // Kill the device; the cached name must still resolve.
    drop(server);
    let id = fleet
        .resolve_component(&dev, ComponentType::Switch, "kitchen")
        .await
        .unwrap();
    assert_eq!(id, 0);
}

#[tokio::test]
async fn gen1_settings_resolve_by_array_position() {
    let server = gen1_device().await;
    let fleet = fleet();
    let dev = device("heater", &server, Some(Generation::Gen1));

    let id = fleet
        .resolve_component(&dev, ComponentType::Switch, "heater")
        .await
        .unwrap();
    assert_eq!(id, 0);
}

// ── Dispatch and probing ────────────────────────────────────────────

#[tokio::test]
async fn unknown_generation_probes_gen2_first_then_falls_back() {
    let server = gen1_device().await;
    let fleet = fleet();
    let dev = device("old-timer", &server, None);

    // The gen2 probe 404s on this device; the gen1 fallback answers.
    let info = fleet.device_info(&dev).await.unwrap();
    assert_eq!(info.generation, Generation::Gen1);
    assert_eq!(info.model.as_deref(), Some("SHSW-1"));
}

#[tokio::test]
async fn learned_generation_feeds_later_dispatch() {
    let server = gen1_device().await;
    let fleet = fleet();
    let dev = device("old-timer", &server, None);

    fleet.device_info(&dev).await.unwrap();

    // Generation is now known: dispatch must go straight to gen1.
    let result = fleet
        .dispatch(
            &dev,
            |client| async move { client.status().await },
            |_client| async { panic!("gen2 path must not run after learning gen1") },
        )
        .await
        .unwrap();
    assert!(result.get("relays").is_some());
}

#[tokio::test]
async fn both_probes_failing_returns_first_tried_error() {
    let server = MockServer::start().await;
    // Gen2 endpoint fails with 500; everything else (gen1 paths) 404s.
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fleet = fleet();
    let dev = device("broken", &server, None);

    let err = fleet.device_info(&dev).await.unwrap_err();
    // No hint: gen2 was tried first, so its error (500) must win over
    // the gen1 fallback's 404.
    assert!(err.to_string().contains("500"), "got: {err}");
}

#[tokio::test]
async fn generation_resolution_failure_fails_fast() {
    let fleet = fleet();
    let dev = unreachable_device("ghost");

    let err = fleet
        .dispatch(
            &dev,
            |_client| async { Ok::<_, relayctl_rpc::Error>(()) },
            |_client| async { Ok::<_, relayctl_rpc::Error>(()) },
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::GenerationResolutionFailed { .. }),
        "got: {err}"
    );
}

// ── Switch operations by name ───────────────────────────────────────

#[tokio::test]
async fn set_switch_resolves_name_then_dispatches_gen2() {
    let server = gen2_device().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({
            "method": "Switch.Set",
            "params": { "id": 0, "on": true }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 1, "result": { "was_on": false } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fleet = fleet();
    let dev = device("a", &server, Some(Generation::Gen2));

    fleet.set_switch(&dev, "Kitchen", true).await.unwrap();
}

#[tokio::test]
async fn set_switch_dispatches_gen1_relay_endpoint() {
    let server = gen1_device().await;

    Mock::given(method("GET"))
        .and(path("/relay/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ison": false })))
        .expect(1)
        .mount(&server)
        .await;

    let fleet = fleet();
    let dev = device("heater", &server, Some(Generation::Gen1));

    fleet.set_switch(&dev, "Heater", false).await.unwrap();
}

// ── Collection scenarios ────────────────────────────────────────────

#[tokio::test]
async fn collection_isolates_unreachable_device() {
    let server = gen2_device().await;
    let fleet = fleet();
    let devices = vec![
        device("a", &server, Some(Generation::Gen2)),
        unreachable_device("b"),
    ];

    let result = fleet
        .collect_telemetry(&devices, &CancellationToken::new())
        .await;

    assert_eq!(result.reports.len(), 2);

    let a = &result.reports[0];
    assert!(a.online);
    assert_eq!(a.readings.len(), 1);
    assert_eq!(a.readings[0].id, SWITCH_POWER_ID_BASE);
    assert_eq!(a.readings[0].power_w, Some(40.0));

    let b = &result.reports[1];
    assert!(!b.online);
    assert!(b.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(b.readings.is_empty());

    // Totals come from A alone.
    assert_eq!(result.totals.online, 1);
    assert_eq!(result.totals.offline, 1);
    assert!((result.totals.power_w - 40.0).abs() < f64::EPSILON);
    assert!((result.totals.energy_wh - 1200.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn reachable_device_without_meters_is_online() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "Shelly.GetStatus" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": { "input:0": { "id": 0, "state": false } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "Shelly.GetDeviceInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": { "id": "sensor", "gen": 2, "auth_en": false }
        })))
        .mount(&server)
        .await;

    let fleet = fleet();
    let devices = vec![device("sensor", &server, Some(Generation::Gen2))];

    let result = fleet
        .collect_telemetry(&devices, &CancellationToken::new())
        .await;

    let report = &result.reports[0];
    assert!(report.online);
    assert!(report.readings.is_empty());
    assert_eq!(result.totals.online, 1);
    assert_eq!(result.totals.peak_power_w, Some(0.0));
}

#[tokio::test]
async fn mixed_generation_fleet_collects_both() {
    let g2 = gen2_device().await;
    let g1 = gen1_device().await;
    let fleet = fleet();
    let devices = vec![
        device("plug", &g2, Some(Generation::Gen2)),
        device("heater", &g1, Some(Generation::Gen1)),
    ];

    let result = fleet
        .collect_telemetry(&devices, &CancellationToken::new())
        .await;

    assert!(result.reports.iter().all(|r| r.online));
    // 40 W from the plug's switch meter + 55 W from the gen1 meter.
    assert!((result.totals.power_w - 95.0).abs() < f64::EPSILON);
    // Gen1 counter is watt-minutes: 1800 Wm = 30 Wh, plus 1200 Wh.
    assert!((result.totals.energy_wh - 1230.0).abs() < f64::EPSILON);
    assert_eq!(result.totals.peak_power_w, Some(55.0));
    assert_eq!(result.totals.min_power_w, Some(40.0));
}
