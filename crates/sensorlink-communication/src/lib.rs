//! # SensorLink Communication
//!
//! Serial links to the display controllers and the pool that broadcasts
//! encoded commands across all of them.

pub mod communication;

pub use communication::{
    list_ports, BridgePool, BroadcastResult, Connection, LinkSettings, MockOpener, MockTransport,
    PortOpener, RealSerialPort, SerialPortInfo, SerialPortOpener, SerialTransport,
    DEFAULT_BAUD_RATE,
};
