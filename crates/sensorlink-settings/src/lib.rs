//! SensorLink Settings Crate
//!
//! Handles application configuration: file loading, environment overrides,
//! and validation.

pub mod config;
pub mod error;

pub use config::{
    Config, ConnectionSettings, LogFormat, LoggingSettings, PortEntry, ServerSettings,
    VoiceSettings, ENV_HOST, ENV_LEGACY_HOST, ENV_LEGACY_LISTEN_PORT, ENV_LISTEN_PORT, ENV_PORT,
    ENV_PORTS, ENV_VOICE_SHRINK, MIN_SETTLE_DELAY_MS, REQUIRED_BAUD_RATE,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
