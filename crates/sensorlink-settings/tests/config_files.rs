use sensorlink_settings::{Config, ConfigError, LogFormat, PortEntry, SettingsError};
use std::fs;
use tempfile::tempdir;

fn sample_config() -> Config {
    let mut config = Config::default();
    config.connection.ports = vec![
        PortEntry::named("left", "/dev/ttyACM0"),
        PortEntry::new("/dev/ttyACM1"),
    ];
    config.server.port = 8080;
    config.logging.format = LogFormat::Json;
    config
}

#[test]
fn test_toml_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.toml");

    let config = sample_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("bridge.json");

    let config = sample_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded.connection.ports, config.connection.ports);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.yaml");
    fs::write(&path, "server: {}").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError { .. }));
}

#[test]
fn test_invalid_file_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    fs::write(
        &path,
        r#"
        [connection]
        baud_rate = 0
        "#,
    )
    .unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_malformed_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    fs::write(&path, "[connection\nports = ").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}
