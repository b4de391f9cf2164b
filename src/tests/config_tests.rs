use std::time::Duration;

use crate::{PipelineConfig, PipelineError, Settings};

#[test]
fn test_default_settings_match_default_config() {
    let config = Settings::default().into_pipeline_config().unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.separator, b',');
    assert_eq!(config.completion_marker, "OK");
}

#[test]
fn test_settings_convert_units() {
    let settings = Settings {
        chunk_size: 8,
        processor_delay_ms: 200,
        read_timeout_ms: Some(1500),
        ..Default::default()
    };
    let config = settings.into_pipeline_config().unwrap();
    assert_eq!(config.chunk_size, 8);
    assert_eq!(config.processor_delay, Duration::from_millis(200));
    assert_eq!(config.read_timeout, Some(Duration::from_millis(1500)));
}

#[test]
fn test_invalid_settings() {
    let zero_chunk = Settings {
        chunk_size: 0,
        ..Default::default()
    };
    assert!(matches!(
        zero_chunk.into_pipeline_config(),
        Err(PipelineError::InvalidConfig(_))
    ));

    let wide_separator = Settings {
        separator: '\u{2192}',
        ..Default::default()
    };
    assert!(matches!(
        wide_separator.into_pipeline_config(),
        Err(PipelineError::InvalidConfig(_))
    ));
}

#[test]
fn test_load_settings_from_file() {
    let path = std::env::temp_dir().join(format!("capitalize-settings-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "chunk_size = 16\nseparator = \"|\"\ncompletion_marker = \"DONE\"\nread_timeout_ms = 250\n",
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path()));
    std::fs::remove_file(&path).unwrap();
    let settings = settings.unwrap();

    assert_eq!(settings.chunk_size, 16);
    assert_eq!(settings.separator, '|');
    assert_eq!(settings.completion_marker, "DONE");
    assert_eq!(settings.read_timeout_ms, Some(250));
    assert_eq!(settings.processor_delay_ms, 0);
}

#[test]
fn test_missing_settings_file_is_an_error() {
    let path = std::env::temp_dir().join("capitalize-settings-does-not-exist.toml");
    assert!(Settings::load(Some(path.as_path())).is_err());
}
