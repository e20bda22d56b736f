//! Last-known sensor values per device
//!
//! The store keeps exactly one value per device and metric, overwritten on
//! every accepted event. Reads return a copy so a status query never holds
//! the lock while it formats a response, and never touches the serial layer.

use crate::command::{DeviceId, Metric};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest readings for one device. `None` means never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Last temperature
    pub temperature: Option<f64>,
    /// Last humidity
    pub humidity: Option<f64>,
    /// Last moisture
    pub moisture: Option<f64>,
}

impl SensorSnapshot {
    /// Value for a metric, `None` when unset
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Moisture => self.moisture,
        }
    }

    fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Temperature => self.temperature = Some(value),
            Metric::Humidity => self.humidity = Some(value),
            Metric::Moisture => self.moisture = Some(value),
        }
    }
}

/// Thread-safe snapshot store shared by request handlers
#[derive(Debug, Default)]
pub struct SnapshotStore {
    devices: RwLock<BTreeMap<DeviceId, SensorSnapshot>>,
}

impl SnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the last-known value of `metric` for `device`
    pub fn record(&self, device: DeviceId, metric: Metric, value: f64) {
        tracing::trace!("Snapshot {} {} = {}", device, metric, value);
        self.devices.write().entry(device).or_default().set(metric, value);
    }

    /// Snapshot for a single device, all-unset if never observed
    pub fn get(&self, device: DeviceId) -> SensorSnapshot {
        self.devices.read().get(&device).copied().unwrap_or_default()
    }

    /// Point-in-time copy of every known device
    ///
    /// Every device in [`DeviceId::ALL`] is present; devices never observed
    /// map to an all-unset snapshot.
    pub fn read_all(&self) -> BTreeMap<DeviceId, SensorSnapshot> {
        let devices = self.devices.read();
        DeviceId::ALL
            .iter()
            .map(|id| (*id, devices.get(id).copied().unwrap_or_default()))
            .collect()
    }
}
