//! # SensorLink
//!
//! Relays sensor readings and voice text to line-oriented microcontroller
//! displays attached over serial:
//! - Temperature, humidity, and moisture events from sensor units
//! - Voice text, shortened to fit the display's voice box
//! - Any number of displays, each receiving every command
//!
//! ## Architecture
//!
//! SensorLink is organized as a workspace with multiple crates:
//!
//! 1. **sensorlink-core** - Error types, wire codec, snapshot store, text shortening
//! 2. **sensorlink-communication** - Serial connections and the broadcast pool
//! 3. **sensorlink-settings** - Configuration files and environment overrides
//! 4. **sensorlink** - HTTP front end and the binary that wires it all together

pub mod bootstrap;
pub mod server;

pub use sensorlink_communication::{
    list_ports, BridgePool, BroadcastResult, Connection, LinkSettings, PortOpener,
    SerialPortInfo, SerialPortOpener,
};

pub use sensorlink_core::{
    Command, CommandError, ConnectionError, DeviceId, Error, IntentShortener, Metric, Result,
    SensorSnapshot, SnapshotStore, TextShortener,
};

pub use sensorlink_settings::{Config, LogFormat, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output, pretty or JSON per configuration
/// - RUST_LOG environment variable support, falling back to the configured level
/// - Thread ids and line numbers on every event
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter {:?}: {}", settings.level, e))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}
