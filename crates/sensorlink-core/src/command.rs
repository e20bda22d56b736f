//! Display commands and the line-oriented wire codec
//!
//! Every event forwarded to a display is encoded as one ASCII line:
//!
//! ```text
//! S <device> T <float, 1 decimal>      temperature
//! S <device> H <integer>               humidity
//! S <device> M <integer>               moisture
//! V <device> <text, at most 12 chars>  voice/display text
//! ```
//!
//! Lines produced here never contain a terminator; the connection appends
//! `\n` before writing.

use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the voice box on the display, in characters
pub const VOICE_MAX_CHARS: usize = 12;

/// Line terminator understood by the firmware
pub const LINE_TERMINATOR: char = '\n';

/// Originating sensor unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceId {
    /// Sensor unit A
    A,
    /// Sensor unit B
    B,
}

impl DeviceId {
    /// All known device ids, in display order
    pub const ALL: [DeviceId; 2] = [DeviceId::A, DeviceId::B];

    /// Wire token for this device
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(CommandError::UnknownDevice {
                device: other.to_string(),
            }),
        }
    }
}

/// Sensor metric kept in the snapshot store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Air temperature
    Temperature,
    /// Relative humidity
    Humidity,
    /// Soil moisture
    Moisture,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
            Self::Moisture => write!(f, "moisture"),
        }
    }
}

impl FromStr for Metric {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temp" | "temperature" => Ok(Self::Temperature),
            "humid" | "humidity" => Ok(Self::Humidity),
            "moist" | "moisture" => Ok(Self::Moisture),
            other => Err(CommandError::UnknownMetric {
                metric: other.to_string(),
            }),
        }
    }
}

/// Kind of a display command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Temperature reading
    Temperature,
    /// Humidity reading
    Humidity,
    /// Moisture reading
    Moisture,
    /// Voice/display text
    Voice,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
            Self::Moisture => write!(f, "moisture"),
            Self::Voice => write!(f, "voice"),
        }
    }
}

/// A typed event destined for the displays
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Temperature in degrees, rendered with one decimal
    Temperature {
        /// Originating device
        device: DeviceId,
        /// Reading
        value: f64,
    },
    /// Relative humidity in percent
    Humidity {
        /// Originating device
        device: DeviceId,
        /// Reading
        value: i64,
    },
    /// Soil moisture, raw sensor units
    Moisture {
        /// Originating device
        device: DeviceId,
        /// Reading
        value: i64,
    },
    /// Short text for the voice box
    Voice {
        /// Originating device
        device: DeviceId,
        /// Text; truncated on encode
        text: String,
    },
}

impl Command {
    /// Temperature command
    pub fn temperature(device: DeviceId, value: f64) -> Self {
        Self::Temperature { device, value }
    }

    /// Humidity command
    pub fn humidity(device: DeviceId, value: i64) -> Self {
        Self::Humidity { device, value }
    }

    /// Moisture command
    pub fn moisture(device: DeviceId, value: i64) -> Self {
        Self::Moisture { device, value }
    }

    /// Voice command
    pub fn voice(device: DeviceId, text: impl Into<String>) -> Self {
        Self::Voice {
            device,
            text: text.into(),
        }
    }

    /// Command kind
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Temperature { .. } => CommandKind::Temperature,
            Self::Humidity { .. } => CommandKind::Humidity,
            Self::Moisture { .. } => CommandKind::Moisture,
            Self::Voice { .. } => CommandKind::Voice,
        }
    }

    /// Target device
    pub fn device(&self) -> DeviceId {
        match self {
            Self::Temperature { device, .. }
            | Self::Humidity { device, .. }
            | Self::Moisture { device, .. }
            | Self::Voice { device, .. } => *device,
        }
    }

    /// Encode into a single wire line without terminator
    pub fn encode(&self) -> Result<String, CommandError> {
        match self {
            Self::Temperature { device, value } => {
                if !value.is_finite() {
                    return Err(CommandError::NonFiniteValue {
                        kind: CommandKind::Temperature.to_string(),
                    });
                }
                Ok(format!("S {} T {:.1}", device, value))
            }
            Self::Humidity { device, value } => Ok(format!("S {} H {}", device, value)),
            Self::Moisture { device, value } => Ok(format!("S {} M {}", device, value)),
            Self::Voice { device, text } => Ok(format!("V {} {}", device, voice_payload(text))),
        }
    }
}

/// Convert a fractional reading to the integer the display shows
///
/// Truncates toward zero. Non-finite readings are rejected.
pub fn integer_reading(kind: CommandKind, value: f64) -> Result<i64, CommandError> {
    if !value.is_finite() {
        return Err(CommandError::NonFiniteValue {
            kind: kind.to_string(),
        });
    }
    Ok(value.trunc() as i64)
}

/// Sanitize and hard-truncate voice text to the display box width
///
/// Control characters become spaces and non-ASCII characters become `?`
/// so the result is always a single ASCII line.
pub fn voice_payload(text: &str) -> String {
    text.chars()
        .take(VOICE_MAX_CHARS)
        .map(|c| {
            if c.is_control() {
                ' '
            } else if c.is_ascii() {
                c
            } else {
                '?'
            }
        })
        .collect()
}
