//! Broadcast pool of display connections
//!
//! The pool owns every configured [`Connection`] in configuration order and
//! addresses them collectively. Each broadcast fans out across members on
//! scoped threads and joins them all before returning, so one slow or hung
//! display delays the result but never blocks sends to its siblings.

use super::connection::Connection;
use super::serial::{LinkSettings, PortOpener};
use parking_lot::RwLock;
use sensorlink_core::{Command, CommandError, ConnectionError, DeviceId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-connection outcome of one broadcast, keyed by display name
pub type BroadcastResult = BTreeMap<String, bool>;

/// Ordered set of named connections
pub struct BridgePool {
    opener: Arc<dyn PortOpener>,
    settings: LinkSettings,
    connections: RwLock<Vec<Arc<Connection>>>,
}

impl std::fmt::Debug for BridgePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgePool")
            .field("settings", &self.settings)
            .field("connections", &*self.connections.read())
            .finish()
    }
}

impl BridgePool {
    /// Create an empty pool whose members are opened through `opener`
    pub fn new(opener: Arc<dyn PortOpener>, settings: LinkSettings) -> Self {
        Self {
            opener,
            settings,
            connections: RwLock::new(Vec::new()),
        }
    }

    /// Link settings applied to every member
    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Connect `port` and append it to the pool
    ///
    /// The name defaults to the port and must be unique within the pool.
    /// Connections that fail to open are not retained.
    pub fn add(&self, port: &str, name: Option<&str>) -> Result<(), ConnectionError> {
        let name = name.unwrap_or(port).to_string();
        if self.contains(&name) {
            tracing::warn!("Refusing to add {}: name {} already in use", port, name);
            return Err(ConnectionError::DuplicateName { name });
        }

        let connection = Arc::new(Connection::new(port, Some(name.clone()), self.settings));
        connection.connect(self.opener.as_ref())?;

        let mut connections = self.connections.write();
        // Another caller may have added the same name while we were settling.
        if connections.iter().any(|c| c.name() == name) {
            drop(connections);
            connection.close();
            return Err(ConnectionError::DuplicateName { name });
        }
        connections.push(connection);
        Ok(())
    }

    /// Whether a member with this display name exists
    pub fn contains(&self, name: &str) -> bool {
        self.connections.read().iter().any(|c| c.name() == name)
    }

    /// Display names in configuration order
    pub fn names(&self) -> Vec<String> {
        self.connections
            .read()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Number of members, open or not
    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    /// Whether the pool has no members
    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }

    /// Members whose transport currently reports open. Not cached.
    pub fn connected_count(&self) -> usize {
        self.members().iter().filter(|c| c.is_open()).count()
    }

    /// Send `line` to every member and collect each outcome
    ///
    /// A failing member maps to `false` and does not stop the others.
    pub fn broadcast(&self, line: &str) -> BroadcastResult {
        let members = self.members();
        match members.as_slice() {
            [] => {
                tracing::warn!("Broadcast with no connections: {}", line);
                BroadcastResult::new()
            }
            [only] => BroadcastResult::from([(only.name().to_string(), only.send(line).is_ok())]),
            _ => std::thread::scope(|scope| {
                let handles: Vec<_> = members
                    .iter()
                    .map(|conn| (conn.name(), scope.spawn(move || conn.send(line).is_ok())))
                    .collect();

                handles
                    .into_iter()
                    .map(|(name, handle)| {
                        let sent = handle.join().unwrap_or_else(|_| {
                            tracing::error!("Send thread for {} panicked", name);
                            false
                        });
                        (name.to_string(), sent)
                    })
                    .collect()
            }),
        }
    }

    /// Encode `command` and broadcast it
    pub fn send_command(&self, command: &Command) -> Result<BroadcastResult, CommandError> {
        let line = command.encode()?;
        Ok(self.broadcast(&line))
    }

    /// Broadcast a temperature reading
    pub fn send_temperature(
        &self,
        device: DeviceId,
        value: f64,
    ) -> Result<BroadcastResult, CommandError> {
        self.send_command(&Command::temperature(device, value))
    }

    /// Broadcast a humidity reading
    pub fn send_humidity(
        &self,
        device: DeviceId,
        value: i64,
    ) -> Result<BroadcastResult, CommandError> {
        self.send_command(&Command::humidity(device, value))
    }

    /// Broadcast a moisture reading
    pub fn send_moisture(
        &self,
        device: DeviceId,
        value: i64,
    ) -> Result<BroadcastResult, CommandError> {
        self.send_command(&Command::moisture(device, value))
    }

    /// Broadcast voice text; truncated to the display box width
    pub fn send_voice(&self, device: DeviceId, text: &str) -> Result<BroadcastResult, CommandError> {
        self.send_command(&Command::voice(device, text))
    }

    /// Close every member and empty the pool
    pub fn close_all(&self) {
        let members = std::mem::take(&mut *self.connections.write());
        for conn in &members {
            conn.close();
        }
        tracing::info!("Closed {} connection(s)", members.len());
    }

    fn members(&self) -> Vec<Arc<Connection>> {
        self.connections.read().clone()
    }
}
