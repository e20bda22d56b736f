//! Startup wiring: configuration to a populated pool and shared state

use crate::server::AppState;
use sensorlink_communication::{BridgePool, LinkSettings, PortOpener};
use sensorlink_core::{IntentShortener, SnapshotStore};
use sensorlink_settings::{Config, ConnectionSettings};
use std::sync::Arc;

/// Link settings from the connection section
pub fn link_settings(connection: &ConnectionSettings) -> LinkSettings {
    LinkSettings {
        baud_rate: connection.baud_rate,
        read_timeout: connection.read_timeout(),
        settle_delay: connection.settle_delay(),
        response_window: connection.response_window(),
    }
}

/// Build the pool and connect every configured port in order
///
/// Ports that fail to open are logged and left out; the pool is returned
/// even when none connected so the service can still report its health.
/// Blocks for the settle delay of every port that opens.
pub fn build_pool(config: &Config, opener: Arc<dyn PortOpener>) -> BridgePool {
    let pool = BridgePool::new(opener, link_settings(&config.connection));

    for entry in &config.connection.ports {
        match pool.add(&entry.port, entry.name.as_deref()) {
            Ok(()) => tracing::info!("Display {} ready on {}", entry.display_name(), entry.port),
            Err(e) => tracing::warn!("Display {} unavailable: {}", entry.display_name(), e),
        }
    }

    if config.connection.ports.is_empty() {
        tracing::warn!("No serial ports configured - display updates will not work");
    } else if pool.connected_count() == 0 {
        tracing::warn!("No serial connection could be opened - display updates will not work");
    }

    pool
}

/// Shared state handed to the HTTP layer
pub fn app_state(config: &Config, pool: Arc<BridgePool>) -> AppState {
    AppState {
        pool,
        snapshots: Arc::new(SnapshotStore::new()),
        shortener: Arc::new(IntentShortener::new(config.voice.max_chars)),
        shrink_by_default: config.voice.shrink_by_default,
    }
}
