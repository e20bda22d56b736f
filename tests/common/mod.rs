//! Shared fixtures for HTTP tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sensorlink::bootstrap::{app_state, build_pool};
use sensorlink::Config;
use sensorlink_communication::{MockOpener, MockTransport};
use sensorlink_settings::PortEntry;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// A router over two mock displays, `X` and `Y`, plus handles to both
pub struct TestBridge {
    pub router: Router,
    pub x: MockTransport,
    pub y: MockTransport,
}

pub fn test_config(ports: Vec<PortEntry>) -> Config {
    let mut config = Config::default();
    config.connection.ports = ports;
    config.connection.settle_delay_ms = 0;
    config.connection.response_window_ms = 0;
    config
}

pub fn create_test_bridge() -> TestBridge {
    let x = MockTransport::new();
    let y = MockTransport::new();
    let opener = MockOpener::new()
        .with_port("/dev/ttyACM0", x.clone())
        .with_port("/dev/ttyACM1", y.clone());
    let config = test_config(vec![
        PortEntry::named("X", "/dev/ttyACM0"),
        PortEntry::named("Y", "/dev/ttyACM1"),
    ]);
    TestBridge {
        router: router_for(&config, opener),
        x,
        y,
    }
}

pub fn router_for(config: &Config, opener: MockOpener) -> Router {
    let pool = Arc::new(build_pool(config, Arc::new(opener)));
    sensorlink::server::router(app_state(config, pool))
}

pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    raw_request(app, method, uri, body).await
}

pub async fn raw_request(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}
