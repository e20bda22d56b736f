//! In-memory transports for exercising connections and pools without hardware

use super::serial::{LinkSettings, PortOpener, SerialTransport};
use parking_lot::Mutex;
use sensorlink_core::ConnectionError;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct MockState {
    written: Vec<u8>,
    responses: VecDeque<String>,
    open: bool,
    fail_writes: bool,
    fail_reads: bool,
    close_count: usize,
    byte_delay: Duration,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            written: Vec::new(),
            responses: VecDeque::new(),
            open: true,
            fail_writes: false,
            fail_reads: false,
            close_count: 0,
            byte_delay: Duration::ZERO,
        }
    }
}

/// Scriptable transport recording every byte written to it
///
/// Clones share state, so a test keeps one clone for inspection and hands
/// the other to a [`MockOpener`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// A healthy transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between individual bytes of a write
    ///
    /// Bytes are appended one at a time without holding the transport's own
    /// lock, so unserialised writers would visibly interleave.
    pub fn with_byte_delay(self, delay: Duration) -> Self {
        self.state.lock().byte_delay = delay;
        self
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make subsequent response reads fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Set what `is_open` reports
    pub fn set_open(&self, open: bool) {
        self.state.lock().open = open;
    }

    /// Queue a response line for the next read
    pub fn push_response(&self, line: impl Into<String>) {
        self.state.lock().responses.push_back(line.into());
    }

    /// Responses not consumed yet
    pub fn pending_responses(&self) -> usize {
        self.state.lock().responses.len()
    }

    /// Raw bytes written so far
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Written bytes split into lines, terminators removed
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.state.lock().written)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Times `close` was called
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }
}

impl SerialTransport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let delay = {
            let state = self.state.lock();
            if state.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
            }
            state.byte_delay
        };

        for byte in data {
            self.state.lock().written.push(*byte);
            if delay.is_zero() {
                std::thread::yield_now();
            } else {
                std::thread::sleep(delay);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_response(&mut self, _window: Duration) -> io::Result<Option<String>> {
        let mut state = self.state.lock();
        if state.fail_reads {
            return Err(io::Error::other("mock read failure"));
        }
        Ok(state.responses.pop_front())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        state.open = false;
        state.close_count += 1;
        Ok(())
    }
}

/// Opener serving registered [`MockTransport`]s by port name
///
/// Unregistered ports fail to open, like a missing device.
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    ports: HashMap<String, MockTransport>,
    opens: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockOpener {
    /// An opener with no reachable ports
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `port` reachable, backed by `transport`
    pub fn with_port(mut self, port: impl Into<String>, transport: MockTransport) -> Self {
        self.ports.insert(port.into(), transport);
        self
    }

    /// Successful opens of `port` so far
    pub fn open_count(&self, port: &str) -> usize {
        self.opens.lock().get(port).copied().unwrap_or(0)
    }
}

impl PortOpener for MockOpener {
    fn open(
        &self,
        port: &str,
        _settings: &LinkSettings,
    ) -> Result<Box<dyn SerialTransport>, ConnectionError> {
        let transport = self
            .ports
            .get(port)
            .ok_or_else(|| ConnectionError::FailedToOpen {
                port: port.to_string(),
                reason: "No such device".to_string(),
            })?;

        transport.set_open(true);
        *self.opens.lock().entry(port.to_string()).or_insert(0) += 1;
        Ok(Box::new(transport.clone()))
    }
}
