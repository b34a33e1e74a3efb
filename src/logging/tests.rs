//! Tests for the logging system

use super::*;

#[test]
fn test_log_level_display() {
    assert_eq!(LogLevel::Trace.to_string(), "trace");
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!(LogLevel::Info.to_string(), "info");
    assert_eq!(LogLevel::Warn.to_string(), "warn");
    assert_eq!(LogLevel::Error.to_string(), "error");
}

#[test]
fn test_log_level_to_tracing_level() {
    assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
    assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Text);
    assert_eq!(config.output, LogOutput::Both);
    assert!(config.include_target);
    assert!(!config.include_thread_id);
    assert!(!config.include_file_info);
}

#[test]
fn test_logging_config_builder() {
    let config = LoggingConfig::new()
        .with_level(LogLevel::Debug)
        .with_format(LogFormat::Json)
        .with_output(LogOutput::File)
        .with_module_level("splat_gate::gateway", LogLevel::Trace);

    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::File);
    assert_eq!(
        config.module_levels.get("splat_gate::gateway"),
        Some(&LogLevel::Trace)
    );
}

#[test]
fn test_logging_config_development() {
    let config = LoggingConfig::development();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.output, LogOutput::Console);
    assert!(config.log_directory.is_none());
    assert!(config.include_file_info);
}

#[test]
fn test_logging_config_production() {
    let config = LoggingConfig::production();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::Both);
    assert!(config.log_directory.is_some());
}

#[test]
fn test_logging_config_serde_roundtrip() {
    let config = LoggingConfig::production().with_module_level("hyper", LogLevel::Warn);
    let json = serde_json::to_string(&config).unwrap();
    let parsed: LoggingConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.level, config.level);
    assert_eq!(parsed.format, config.format);
    assert_eq!(parsed.module_levels.get("hyper"), Some(&LogLevel::Warn));
}
