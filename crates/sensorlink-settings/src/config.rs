//! Configuration for SensorLink
//!
//! Provides configuration file handling, environment overrides, and validation.
//! Supports JSON and TOML file formats; the default location is the
//! platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (ports, baud rate, timing)
//! - Server settings (listen address)
//! - Voice settings (text shortening)
//! - Logging settings (output format)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use sensorlink_core::VOICE_MAX_CHARS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Single serial port
pub const ENV_PORT: &str = "ARDUINO_COM_PORT";
/// Comma-separated list of `port` or `name=port` entries
pub const ENV_PORTS: &str = "ARDUINO_COM_PORTS";
/// Listen host
pub const ENV_HOST: &str = "BRIDGE_HOST";
/// Listen port
pub const ENV_LISTEN_PORT: &str = "BRIDGE_PORT";
/// Older listen host name, read when `BRIDGE_HOST` is unset
pub const ENV_LEGACY_HOST: &str = "FLASK_HOST";
/// Older listen port name, read when `BRIDGE_PORT` is unset
pub const ENV_LEGACY_LISTEN_PORT: &str = "FLASK_PORT";
/// Whether voice text is shortened when the request does not say
pub const ENV_VOICE_SHRINK: &str = "VOICE_SHRINK";

/// Baud rate the display firmware is built for
pub const REQUIRED_BAUD_RATE: u32 = 115_200;

/// Boards reset when the port opens and drop anything sent before this
pub const MIN_SETTLE_DELAY_MS: u64 = 2000;

/// One configured display port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    /// Port identifier, e.g. "/dev/ttyACM0" or "COM3"
    pub port: String,
    /// Display name; defaults to the port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PortEntry {
    /// Entry named after its port
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            name: None,
        }
    }

    /// Entry with an explicit display name
    pub fn named(name: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            name: Some(name.into()),
        }
    }

    /// Name used as the result key
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.port)
    }

    /// Parse `port` or `name=port`
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        match entry.split_once('=') {
            Some((name, port)) if !name.trim().is_empty() && !port.trim().is_empty() => {
                Some(Self::named(name.trim(), port.trim()))
            }
            Some(_) => None,
            None => Some(Self::new(entry)),
        }
    }
}

/// Serial connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Displays to connect at startup, in broadcast order
    pub ports: Vec<PortEntry>,
    /// Baud rate for serial connections; must match the firmware
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Wait after opening a port, in milliseconds; at least 2000
    pub settle_delay_ms: u64,
    /// Wait for a response after each write, in milliseconds
    pub response_window_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            baud_rate: REQUIRED_BAUD_RATE,
            read_timeout_ms: 1000,
            settle_delay_ms: MIN_SETTLE_DELAY_MS,
            response_window_ms: 100,
        }
    }
}

impl ConnectionSettings {
    /// Read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Settle delay after opening
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Response window after writing
    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host or address to bind
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Voice text settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Shorten text unless the request opts out
    pub shrink_by_default: bool,
    /// Shortener output limit in characters
    pub max_chars: usize,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            shrink_by_default: true,
            max_chars: VOICE_MAX_CHARS,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Output format
    pub format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial connections
    pub connection: ConnectionSettings,
    /// HTTP listener
    pub server: ServerSettings,
    /// Voice text handling
    pub voice: VoiceSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/sensorlink/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sensorlink").join("config.toml"))
    }

    /// Resolve the effective configuration
    ///
    /// Loads `path` when given, else the default path when it exists, else
    /// defaults. Environment overrides are applied on top and the result is
    /// validated.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Self::read_file(&default)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = match Format::from_path(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Apply environment-style overrides from `lookup`
    ///
    /// `ARDUINO_COM_PORTS` replaces the port list; otherwise
    /// `ARDUINO_COM_PORT` replaces it with a single port. `FLASK_HOST` and
    /// `FLASK_PORT` apply only when the `BRIDGE_*` names are unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(ENV_PORTS) {
            self.connection.ports = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    PortEntry::parse(s).ok_or_else(|| ConfigError::InvalidEnv {
                        var: ENV_PORTS.to_string(),
                        reason: format!("malformed entry {:?}", s.trim()),
                    })
                })
                .collect::<ConfigResult<_>>()?;
        } else if let Some(port) = lookup(ENV_PORT) {
            let entry = PortEntry::parse(&port).ok_or_else(|| ConfigError::InvalidEnv {
                var: ENV_PORT.to_string(),
                reason: "empty port".to_string(),
            })?;
            self.connection.ports = vec![entry];
        }

        if let Some(host) = lookup(ENV_HOST).or_else(|| lookup(ENV_LEGACY_HOST)) {
            self.server.host = host.trim().to_string();
        }

        let listen_port = lookup(ENV_LISTEN_PORT)
            .map(|value| (ENV_LISTEN_PORT, value))
            .or_else(|| {
                lookup(ENV_LEGACY_LISTEN_PORT).map(|value| (ENV_LEGACY_LISTEN_PORT, value))
            });
        if let Some((var, port)) = listen_port {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                reason: format!("{:?} is not a TCP port", port),
            })?;
        }

        if let Some(shrink) = lookup(ENV_VOICE_SHRINK) {
            self.voice.shrink_by_default = match shrink.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_VOICE_SHRINK.to_string(),
                        reason: format!("{:?} is not a boolean", other),
                    })
                }
            };
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.connection.baud_rate != REQUIRED_BAUD_RATE {
            return Err(out_of_range("connection.baud_rate", self.connection.baud_rate));
        }

        if self.connection.settle_delay_ms < MIN_SETTLE_DELAY_MS {
            return Err(out_of_range(
                "connection.settle_delay_ms",
                self.connection.settle_delay_ms,
            ));
        }

        if self.connection.read_timeout_ms == 0 {
            return Err(out_of_range(
                "connection.read_timeout_ms",
                self.connection.read_timeout_ms,
            ));
        }

        let mut names = HashSet::new();
        for entry in &self.connection.ports {
            if entry.port.trim().is_empty() {
                return Err(out_of_range("connection.ports.port", "\"\""));
            }
            if !names.insert(entry.display_name()) {
                return Err(ConfigError::DuplicatePortName(
                    entry.display_name().to_string(),
                ));
            }
        }

        if self.server.host.trim().is_empty() {
            return Err(out_of_range("server.host", "\"\""));
        }

        if self.voice.max_chars == 0 {
            return Err(out_of_range("voice.max_chars", self.voice.max_chars));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
