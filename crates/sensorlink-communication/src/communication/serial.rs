//! Serial port communication implementation
//!
//! Provides low-level serial port operations for the display controllers
//! attached via USB or RS-232.
//!
//! Supports:
//! - Port enumeration for the `--list-ports` helper
//! - Opening ports at a fixed baud rate with a read timeout
//! - Write-and-forget transmission with an optional echoed response line

use sensorlink_core::{ConnectionError, Error, Result};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Baud rate the display firmware listens on
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Timing and line parameters shared by every connection in a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Timeout applied to reads once a response has started arriving
    pub read_timeout: Duration,
    /// Wait after opening so the controller can finish its power-on reset
    pub settle_delay: Duration,
    /// How long to wait for the first response byte after a write
    pub response_window: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            response_window: Duration::from_millis(100),
        }
    }
}

/// Information about an available serial port
#[derive(Debug, Clone, Serialize)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports that look like attached microcontroller boards
///
/// Only informational: pool members are always configured explicitly.
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_board_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb_info) => {
                    let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                    if let Some(ref mfg) = usb_info.manufacturer {
                        info = info.with_manufacturer(mfg);
                    }
                    if let Some(ref serial) = usb_info.serial_number {
                        info = info.with_serial_number(serial);
                    }
                    info
                }
                _ => info,
            }
        })
        .collect())
}

/// Check if a port name matches the patterns boards enumerate under
///
/// - Windows: COM* (COM1, COM2, etc.)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub(crate) fn is_board_port(port_name: &str) -> bool {
    if let Some(suffix) = port_name.strip_prefix("COM") {
        return !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Byte-level link to one display controller
///
/// Implementations are driven by a single [`Connection`](super::Connection),
/// which serialises access, so methods take `&mut self`.
pub trait SerialTransport: Send {
    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush buffered output to the device
    fn flush(&mut self) -> io::Result<()>;

    /// Wait up to `window` for a response and read one line of it
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn read_response(&mut self, window: Duration) -> io::Result<Option<String>>;

    /// Whether the underlying handle is still usable
    fn is_open(&self) -> bool;

    /// Release the underlying handle
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens transports for a port name
///
/// The seam that lets a pool be built against real hardware or test doubles.
pub trait PortOpener: Send + Sync {
    /// Open `port` with the given settings
    fn open(
        &self,
        port: &str,
        settings: &LinkSettings,
    ) -> std::result::Result<Box<dyn SerialTransport>, ConnectionError>;
}

/// Opens real serial ports through the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortOpener;

impl PortOpener for SerialPortOpener {
    fn open(
        &self,
        port: &str,
        settings: &LinkSettings,
    ) -> std::result::Result<Box<dyn SerialTransport>, ConnectionError> {
        Ok(Box::new(RealSerialPort::open(port, settings)?))
    }
}

/// Real serial port implementation using serialport crate
pub struct RealSerialPort {
    port: Box<dyn serialport::SerialPort>,
    read_timeout: Duration,
}

impl RealSerialPort {
    /// Open a serial port with the given parameters
    pub fn open(port: &str, settings: &LinkSettings) -> std::result::Result<Self, ConnectionError> {
        if settings.baud_rate == 0 {
            return Err(ConnectionError::InvalidParameters {
                reason: "baud rate must be > 0".to_string(),
            });
        }

        let handle = serialport::new(port, settings.baud_rate)
            .timeout(settings.read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| ConnectionError::FailedToOpen {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            port: handle,
            read_timeout: settings.read_timeout,
        })
    }

    fn read_line_after_first_byte(&mut self, first: u8) -> io::Result<String> {
        let mut line = vec![first];
        let mut byte = [0u8; 1];
        while line.last() != Some(&b'\n') {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => line.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }
}

impl SerialTransport for RealSerialPort {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.port)
    }

    fn read_response(&mut self, window: Duration) -> io::Result<Option<String>> {
        self.port.set_timeout(window)?;
        let mut first = [0u8; 1];
        let waited = match self.port.read(&mut first) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(first[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        };
        self.port.set_timeout(self.read_timeout)?;

        match waited? {
            Some(byte) => self.read_line_after_first_byte(byte).map(Some),
            None => Ok(None),
        }
    }

    fn is_open(&self) -> bool {
        self.port.bytes_to_read().is_ok()
    }
}
