//! Application state shared across all handlers

use sensorlink_communication::BridgePool;
use sensorlink_core::{SnapshotStore, TextShortener};
use std::sync::Arc;

/// Built once at startup and cloned into every request
#[derive(Clone)]
pub struct AppState {
    /// Display connections
    pub pool: Arc<BridgePool>,
    /// Last known readings
    pub snapshots: Arc<SnapshotStore>,
    /// Shortens voice text before display
    pub shortener: Arc<dyn TextShortener>,
    /// Shorten voice text when a request does not say
    pub shrink_by_default: bool,
}
