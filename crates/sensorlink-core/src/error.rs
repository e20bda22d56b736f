//! Error handling for SensorLink
//!
//! Provides error types for the layers of the bridge:
//! - Connection errors (serial port open/write failures)
//! - Command errors (validation before anything reaches the wire)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors raised while opening, writing to, or managing a
/// serial link to a display controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Connection is not open
    #[error("Connection {name} is not open")]
    NotConnected {
        /// The display name of the connection.
        name: String,
    },

    /// A connection with the same display name is already in the pool
    #[error("Connection name already in use: {name}")]
    DuplicateName {
        /// The duplicated display name.
        name: String,
    },

    /// Write to the serial port failed
    #[error("Write to {name} failed: {reason}")]
    WriteFailed {
        /// The display name of the connection.
        name: String,
        /// The transport's error message.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

/// Command error type
///
/// Raised when an event cannot be turned into a wire line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Device id outside the closed set
    #[error("Unknown device id: {device:?}")]
    UnknownDevice {
        /// The rejected device id.
        device: String,
    },

    /// Metric name not recognised
    #[error("Unknown metric: {metric:?}")]
    UnknownMetric {
        /// The rejected metric name.
        metric: String,
    },

    /// NaN or infinite payload
    #[error("{kind} value must be finite")]
    NonFiniteValue {
        /// The command kind carrying the value.
        kind: String,
    },
}

/// Main error type for SensorLink
///
/// A unified error type that can represent any error from the core crates.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a command validation error
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::FailedToOpen {
            port: "/dev/ttyUSB9".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open port /dev/ttyUSB9: No such file or directory"
        );

        let err = ConnectionError::NotConnected {
            name: "left".to_string(),
        };
        assert_eq!(err.to_string(), "Connection left is not open");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::UnknownDevice {
            device: "Z".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown device id: \"Z\"");

        let err = CommandError::NonFiniteValue {
            kind: "temperature".to_string(),
        };
        assert_eq!(err.to_string(), "temperature value must be finite");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ConnectionError::DuplicateName {
            name: "A".to_string(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(!err.is_command_error());

        let err: Error = CommandError::UnknownMetric {
            metric: "pressure".to_string(),
        }
        .into();
        assert!(err.is_command_error());
    }
}
