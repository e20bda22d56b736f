//! HTTP API integration tests

use axum::body::Body;
use axum::http::StatusCode;
use sensorlink_communication::{MockOpener, MockTransport};
use sensorlink_settings::PortEntry;
use serde_json::json;

mod common;
use common::{create_test_bridge, json_request, raw_request, router_for, test_config};

#[tokio::test]
async fn test_health_reports_connections() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(&bridge.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["serial_connected"], true);
    assert_eq!(body["connected_count"], 2);
    assert_eq!(body["version"], sensorlink::VERSION);
}

#[tokio::test]
async fn test_health_tracks_closed_transport() {
    let bridge = create_test_bridge();
    bridge.x.set_open(false);

    let (_, body) = json_request(&bridge.router, "GET", "/health", None).await;
    assert_eq!(body["connected_count"], 1);
    assert_eq!(body["serial_connected"], true);
}

#[tokio::test]
async fn test_health_without_displays() {
    let router = router_for(&test_config(Vec::new()), MockOpener::new());

    let (status, body) = json_request(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serial_connected"], false);
    assert_eq!(body["connected_count"], 0);
}

#[tokio::test]
async fn test_sensor_broadcasts_every_reading() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "A", "temp": 23.456, "humidity": 40.7, "moisture": 512})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["device"], "A");
    assert_eq!(body["sent"]["temp"], json!({"X": true, "Y": true}));
    assert_eq!(body["sent"]["humidity"], json!({"X": true, "Y": true}));
    assert_eq!(body["sent"]["moisture"], json!({"X": true, "Y": true}));

    let expected = vec!["S A T 23.5", "S A H 40", "S A M 512"];
    assert_eq!(bridge.x.written_lines(), expected);
    assert_eq!(bridge.y.written_lines(), expected);
}

#[tokio::test]
async fn test_sensor_only_sends_present_fields() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "b", "moisture": 300})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["sent"].get("temp").is_none());
    assert_eq!(bridge.x.written_lines(), vec!["S B M 300"]);
}

#[tokio::test]
async fn test_sensor_failed_display_reported() {
    let bridge = create_test_bridge();
    bridge.y.set_fail_writes(true);

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "A", "temp": 20.0})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"]["temp"], json!({"X": true, "Y": false}));
    assert_eq!(bridge.x.written_lines(), vec!["S A T 20.0"]);
}

#[tokio::test]
async fn test_sensor_rejects_unknown_device() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "C", "temp": 20.0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains('C'));
    assert!(bridge.x.written().is_empty());
}

#[tokio::test]
async fn test_sensor_rejects_missing_device() {
    let bridge = create_test_bridge();

    let (status, body) =
        json_request(&bridge.router, "POST", "/sensor", Some(json!({"temp": 20.0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(bridge.x.written().is_empty());
}

#[tokio::test]
async fn test_sensor_rejects_malformed_body() {
    let bridge = create_test_bridge();

    let (status, body) =
        raw_request(&bridge.router, "POST", "/sensor", Body::from("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_status_reflects_latest_readings() {
    let bridge = create_test_bridge();

    json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "A", "temp": 21.0, "humidity": 55.9})),
    )
    .await;
    json_request(
        &bridge.router,
        "POST",
        "/sensor",
        Some(json!({"device": "A", "temp": 22.5})),
    )
    .await;

    let (status, body) = json_request(&bridge.router, "GET", "/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["A"]["temperature"], 22.5);
    assert_eq!(body["A"]["humidity"], 55.0);
    assert!(body["A"]["moisture"].is_null());
    assert!(body["B"]["temperature"].is_null());
}

#[tokio::test]
async fn test_status_records_without_displays() {
    let router = router_for(&test_config(Vec::new()), MockOpener::new());

    let (status, _) = json_request(
        &router,
        "POST",
        "/sensor",
        Some(json!({"device": "B", "moisture": 700})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = json_request(&router, "GET", "/status", None).await;
    assert_eq!(body["B"]["moisture"], 700.0);
}

#[tokio::test]
async fn test_voice_shortens_by_default() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/voice",
        Some(json!({"device": "A", "text": "Could you check humidity?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["display_text"], "CHECK HUMID");
    assert_eq!(bridge.x.written_lines(), vec!["V A CHECK HUMID"]);
}

#[tokio::test]
async fn test_voice_without_shrink_truncates() {
    let bridge = create_test_bridge();

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/voice",
        Some(json!({"device": "B", "text": "water the plants now", "shrink": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_text"], "water the pl");
    assert_eq!(bridge.y.written_lines(), vec!["V B water the pl"]);
}

#[tokio::test]
async fn test_voice_partial_delivery() {
    let bridge = create_test_bridge();
    bridge.x.set_fail_writes(true);

    let (status, body) = json_request(
        &bridge.router,
        "POST",
        "/voice",
        Some(json!({"device": "A", "text": "hi", "shrink": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["sent"], json!({"X": false, "Y": true}));
}

#[tokio::test]
async fn test_voice_without_displays_is_error() {
    let router = router_for(&test_config(Vec::new()), MockOpener::new());

    let (status, body) = json_request(
        &router,
        "POST",
        "/voice",
        Some(json!({"device": "A", "text": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["sent"], json!({}));
}

#[tokio::test]
async fn test_voice_requires_text() {
    let bridge = create_test_bridge();

    let (status, body) =
        json_request(&bridge.router, "POST", "/voice", Some(json!({"device": "A"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'text' field");
    assert!(bridge.x.written().is_empty());
}

#[tokio::test]
async fn test_unreachable_port_left_out() {
    let reachable = MockTransport::new();
    let opener = MockOpener::new().with_port("/dev/ttyACM0", reachable.clone());
    let config = test_config(vec![
        PortEntry::named("X", "/dev/ttyACM0"),
        PortEntry::named("Y", "/dev/ttyACM9"),
    ]);
    let router = router_for(&config, opener);

    let (_, body) = json_request(
        &router,
        "POST",
        "/voice",
        Some(json!({"device": "A", "text": "ok", "shrink": false})),
    )
    .await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["sent"], json!({"X": true}));
    assert_eq!(reachable.written_lines(), vec!["V A ok"]);
}
