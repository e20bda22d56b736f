//! Route handlers
//!
//! Serial writes block for up to the response window per display, so every
//! pool call runs on the blocking thread pool.

use super::error::ApiError;
use super::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use sensorlink_communication::BroadcastResult;
use sensorlink_core::{
    integer_reading, voice_payload, CommandError, CommandKind, DeviceId, Metric, SensorSnapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the service answers
    pub status: String,
    /// At least one display is open
    pub serial_connected: bool,
    /// Displays currently open
    pub connected_count: usize,
    /// Configured displays that connected at startup
    pub connections: usize,
    /// Service version
    pub version: String,
}

/// `POST /sensor` body
#[derive(Debug, Deserialize)]
pub struct SensorRequest {
    /// Originating sensor unit
    pub device: String,
    /// Temperature reading
    pub temp: Option<f64>,
    /// Humidity reading; fractional part is dropped
    pub humidity: Option<f64>,
    /// Moisture reading; fractional part is dropped
    pub moisture: Option<f64>,
}

/// `POST /sensor` response
#[derive(Debug, Serialize, Deserialize)]
pub struct SensorResponse {
    /// "ok" once the readings were accepted
    pub status: String,
    /// Device the readings came from
    pub device: DeviceId,
    /// Per-metric, per-display outcomes
    pub sent: BTreeMap<String, BroadcastResult>,
}

/// `POST /voice` body
#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    /// Originating unit
    pub device: String,
    /// Raw or already shortened text
    pub text: Option<String>,
    /// Override the configured shortening default
    pub shrink: Option<bool>,
}

/// `POST /voice` response
#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceResponse {
    /// "ok", "partial", or "error"
    pub status: String,
    /// Text as it appears on the display
    pub display_text: String,
    /// Per-display outcomes
    pub sent: BroadcastResult,
}

/// Overall outcome of a broadcast
///
/// `ok` when every display accepted the line, `partial` when some did,
/// `error` when none did or no display is connected.
pub fn broadcast_status(result: &BroadcastResult) -> &'static str {
    let delivered = result.values().filter(|sent| **sent).count();
    match delivered {
        0 => "error",
        n if n == result.len() => "ok",
        _ => "partial",
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("Serial task failed: {}", e)))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = state.pool.clone();
    let (connected_count, connections) = run_blocking(move || (pool.connected_count(), pool.len()))
        .await
        .unwrap_or((0, 0));

    Json(HealthResponse {
        status: "ok".to_string(),
        serial_connected: connected_count > 0,
        connected_count,
        connections,
        version: crate::VERSION.to_string(),
    })
}

/// Accept sensor readings and forward them to every display
pub async fn sensor(
    State(state): State<AppState>,
    payload: Result<Json<SensorRequest>, JsonRejection>,
) -> Result<Json<SensorResponse>, ApiError> {
    let Json(request) = payload?;
    let device: DeviceId = request.device.parse()?;

    let temp = match request.temp {
        Some(value) if !value.is_finite() => {
            return Err(CommandError::NonFiniteValue {
                kind: CommandKind::Temperature.to_string(),
            }
            .into())
        }
        other => other,
    };
    let humidity = request
        .humidity
        .map(|v| integer_reading(CommandKind::Humidity, v))
        .transpose()?;
    let moisture = request
        .moisture
        .map(|v| integer_reading(CommandKind::Moisture, v))
        .transpose()?;

    tracing::info!(
        "Sensor {}: temp={:?} humidity={:?} moisture={:?}",
        device,
        temp,
        humidity,
        moisture
    );

    if let Some(value) = temp {
        state.snapshots.record(device, Metric::Temperature, value);
    }
    if let Some(value) = humidity {
        state.snapshots.record(device, Metric::Humidity, value as f64);
    }
    if let Some(value) = moisture {
        state.snapshots.record(device, Metric::Moisture, value as f64);
    }

    let pool = state.pool.clone();
    let sent = run_blocking(move || -> Result<_, CommandError> {
        let mut sent = BTreeMap::new();
        if let Some(value) = temp {
            sent.insert("temp".to_string(), pool.send_temperature(device, value)?);
        }
        if let Some(value) = humidity {
            sent.insert("humidity".to_string(), pool.send_humidity(device, value)?);
        }
        if let Some(value) = moisture {
            sent.insert("moisture".to_string(), pool.send_moisture(device, value)?);
        }
        Ok(sent)
    })
    .await??;

    Ok(Json(SensorResponse {
        status: "ok".to_string(),
        device,
        sent,
    }))
}

/// Shorten voice text if requested and show it on every display
pub async fn voice(
    State(state): State<AppState>,
    payload: Result<Json<VoiceRequest>, JsonRejection>,
) -> Result<Json<VoiceResponse>, ApiError> {
    let Json(request) = payload?;
    let device: DeviceId = request.device.parse()?;
    let text = request
        .text
        .ok_or_else(|| ApiError::BadRequest("Missing 'text' field".to_string()))?;

    let text = if request.shrink.unwrap_or(state.shrink_by_default) {
        state.shortener.shorten(&text)
    } else {
        text
    };
    let display_text = voice_payload(&text);
    tracing::info!("Voice {}: {:?}", device, display_text);

    let pool = state.pool.clone();
    let sent = run_blocking(move || pool.send_voice(device, &text)).await??;

    Ok(Json(VoiceResponse {
        status: broadcast_status(&sent).to_string(),
        display_text,
        sent,
    }))
}

/// Last known readings for every device
pub async fn status(State(state): State<AppState>) -> Json<BTreeMap<DeviceId, SensorSnapshot>> {
    Json(state.snapshots.read_all())
}
