//! # SensorLink Core
//!
//! Core types for SensorLink.
//! Provides the error taxonomy, the display command wire codec,
//! the sensor snapshot store, and the text shortening seam.

pub mod command;
pub mod error;
pub mod shorten;
pub mod snapshot;

pub use command::{
    integer_reading, voice_payload, Command, CommandKind, DeviceId, Metric, LINE_TERMINATOR,
    VOICE_MAX_CHARS,
};

pub use error::{CommandError, ConnectionError, Error, Result};

pub use shorten::{IntentShortener, TextShortener};

pub use snapshot::{SensorSnapshot, SnapshotStore};
