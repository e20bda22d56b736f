//! Serial communication layer
//!
//! - [`serial`]: transport seam, real serial ports, port listing
//! - [`connection`]: one locked, named link to a display
//! - [`pool`]: broadcast across all configured links
//! - [`mock`]: in-memory transports for tests and dry runs

pub mod connection;
pub mod mock;
pub mod pool;
pub mod serial;

pub use connection::Connection;
pub use mock::{MockOpener, MockTransport};
pub use pool::{BridgePool, BroadcastResult};
pub use serial::{
    list_ports, LinkSettings, PortOpener, RealSerialPort, SerialPortInfo, SerialPortOpener,
    SerialTransport, DEFAULT_BAUD_RATE,
};
