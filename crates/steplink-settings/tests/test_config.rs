use steplink_settings::{Config, ConfigError, SettingsError};

#[test]
fn test_partial_document_uses_defaults() {
    let config = Config::from_toml_str(
        r#"
[connection]
baud_rate = 57600

[polling]
poll_interval_ms = 50
"#,
    )
    .unwrap();

    assert_eq!(config.connection.baud_rate, 57_600);
    assert_eq!(config.connection.read_timeout_ms, 100);
    assert_eq!(config.polling.poll_interval_ms, 50);
    assert_eq!(config.polling.calibration_followup_ms, 1);
    assert_eq!(config.events.history_size, 256);
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
}

#[test]
fn test_toml_round_trip() {
    let mut config = Config::new();
    config.polling.tick_ms = 5;
    let text = config.to_toml_string().unwrap();
    assert!(text.contains("tick_ms = 5"));
    assert_eq!(Config::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_unsupported_baud_rate() {
    let err = Config::from_toml_str("[connection]\nbaud_rate = 12345\n").unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedBaudRate(12345))
    ));
}

#[test]
fn test_malformed_toml() {
    let err = Config::from_toml_str("[connection\nbaud_rate = 115200").unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}

#[test]
fn test_wrong_type() {
    let err = Config::from_toml_str("[polling]\ntick_ms = \"fast\"\n").unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}

