//! A managed serial link to one display controller
//!
//! State machine: `Closed -> connect -> Open -> close -> Closed`. A failed
//! write leaves the connection `Open`; nothing here reconnects on its own.
//!
//! Every operation that touches the transport holds the connection's lock
//! for its full duration, so two callers can never interleave bytes on the
//! same port. Different connections never share a lock.

use super::serial::{LinkSettings, PortOpener, SerialTransport};
use parking_lot::Mutex;
use sensorlink_core::{ConnectionError, LINE_TERMINATOR};
use std::sync::atomic::{AtomicBool, Ordering};

/// One serial link, identified by port and display name
pub struct Connection {
    port: String,
    name: String,
    settings: LinkSettings,
    transport: Mutex<Option<Box<dyn SerialTransport>>>,
    /// Mirrors `transport.is_some()` for readers that must not wait on the lock
    has_handle: AtomicBool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("port", &self.port)
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("has_handle", &self.has_handle.load(Ordering::Acquire))
            .finish()
    }
}

impl Connection {
    /// Create a closed connection. The name defaults to the port.
    pub fn new(port: impl Into<String>, name: Option<String>, settings: LinkSettings) -> Self {
        let port = port.into();
        let name = name.unwrap_or_else(|| port.clone());
        Self {
            port,
            name,
            settings,
            transport: Mutex::new(None),
            has_handle: AtomicBool::new(false),
        }
    }

    /// Port identifier
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Display name, used as the key in broadcast results
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link settings
    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Open the port and wait out the controller's reset
    ///
    /// Connecting an already open connection is a no-op. On failure the
    /// connection stays closed and nothing is retried.
    pub fn connect(&self, opener: &dyn PortOpener) -> Result<(), ConnectionError> {
        let mut transport = self.transport.lock();
        if transport.is_some() {
            tracing::debug!("Connection {} already open", self.name);
            return Ok(());
        }

        let handle = opener.open(&self.port, &self.settings).map_err(|e| {
            tracing::warn!("Failed to connect {} on {}: {}", self.name, self.port, e);
            e
        })?;

        // Opening the port resets the board; writes before it boots are lost.
        if !self.settings.settle_delay.is_zero() {
            std::thread::sleep(self.settings.settle_delay);
        }

        *transport = Some(handle);
        self.has_handle.store(true, Ordering::Release);
        tracing::info!("Connected {} on {}", self.name, self.port);
        Ok(())
    }

    /// Write one line to the controller
    ///
    /// Appends the line terminator when missing. Success depends only on the
    /// write and flush; a response line, if one arrives within the response
    /// window, is logged and discarded.
    pub fn send(&self, line: &str) -> Result<(), ConnectionError> {
        let mut guard = self.transport.lock();
        let Some(transport) = guard.as_mut() else {
            tracing::warn!("Cannot send to {}: not connected", self.name);
            return Err(ConnectionError::NotConnected {
                name: self.name.clone(),
            });
        };

        let mut data = String::with_capacity(line.len() + 1);
        data.push_str(line);
        if !data.ends_with(LINE_TERMINATOR) {
            data.push(LINE_TERMINATOR);
        }

        if let Err(e) = transport
            .write_all(data.as_bytes())
            .and_then(|()| transport.flush())
        {
            tracing::warn!("Send to {} failed: {}", self.name, e);
            return Err(ConnectionError::WriteFailed {
                name: self.name.clone(),
                reason: e.to_string(),
            });
        }
        tracing::debug!("Sent to {}: {}", self.name, data.trim_end());

        match transport.read_response(self.settings.response_window) {
            Ok(Some(response)) => tracing::debug!("{} responded: {}", self.name, response),
            Ok(None) => {}
            Err(e) => tracing::debug!("Reading response from {} failed: {}", self.name, e),
        }

        Ok(())
    }

    /// Close the underlying handle. Safe to call when already closed.
    pub fn close(&self) {
        let mut transport = self.transport.lock();
        if let Some(mut handle) = transport.take() {
            self.has_handle.store(false, Ordering::Release);
            if let Err(e) = handle.close() {
                tracing::warn!("Error closing {}: {}", self.name, e);
            }
            tracing::info!("Connection {} closed", self.name);
        }
    }

    /// Whether a usable handle is present
    ///
    /// Never waits behind an in-flight send: while the lock is held the
    /// handle's presence is reported instead of probing the transport.
    pub fn is_open(&self) -> bool {
        match self.transport.try_lock() {
            Some(transport) => transport.as_ref().is_some_and(|t| t.is_open()),
            None => self.has_handle.load(Ordering::Acquire),
        }
    }
}
