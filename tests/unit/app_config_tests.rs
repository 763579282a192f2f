/*!
 * Tests for application configuration functionality
 */

use pagewai::app_config::{CUSTOM_LANGUAGE, Config, LogLevel};
use std::time::Duration;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.llm_url, "http://localhost:11434");
    assert_eq!(config.model, "llama2");
    assert_eq!(config.target_language, "Spanish");
    assert!(config.custom_language.is_empty());
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.client.page_timeout_secs, 180);
    assert_eq!(config.client.selection_timeout_secs, 30);
    assert_eq!(config.client.page_max_tokens, 2000);
    assert_eq!(config.client.selection_max_tokens, 1000);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.llm_url = "".to_string();
    assert!(config.validate().is_err());
    config.llm_url = "not a url".to_string();
    assert!(config.validate().is_err());
    config.llm_url = "http://localhost:1234".to_string();

    config.model = "  ".to_string();
    assert!(config.validate().is_err());
    config.model = "mistral".to_string();

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.batch_size = 0;
    assert!(config.validate().is_err());
    config.batch_size = 5;

    config.client.page_timeout_secs = 0;
    assert!(config.validate().is_err());
    config.client.page_timeout_secs = 60;

    assert!(config.validate().is_ok());
}

#[test]
fn test_translation_config_withIsoCode_shouldResolveLanguageName() {
    let config = Config {
        llm_url: " http://localhost:1234 ".to_string(),
        target_language: "fr".to_string(),
        ..Config::default()
    };

    let translation = config.translation_config().expect("valid config");
    assert_eq!(translation.endpoint_url, "http://localhost:1234");
    assert_eq!(translation.model_name, "llama2");
    assert_eq!(translation.target_language_name, "French");
}

#[test]
fn test_translation_config_withCustomLanguage_shouldUseOverride() {
    let config = Config {
        target_language: CUSTOM_LANGUAGE.to_string(),
        custom_language: "Scots Gaelic".to_string(),
        ..Config::default()
    };

    let translation = config.translation_config().expect("valid config");
    assert_eq!(translation.target_language_name, "Scots Gaelic");
}

#[test]
fn test_client_settings_withCustomTimeouts_shouldConvertToDurations() {
    let mut config = Config::default();
    config.client.page_timeout_secs = 90;
    config.client.selection_timeout_secs = 5;

    let settings = config.client.settings();
    assert_eq!(settings.page_timeout, Duration::from_secs(90));
    assert_eq!(settings.selection_timeout, Duration::from_secs(5));
    assert_eq!(settings.page_max_tokens, 2000);
}

/// Test that saving and loading a config file preserves every field
#[test]
fn test_save_and_load_withTempFile_shouldRoundTrip() {
    let temp_dir = common::create_temp_dir().expect("temp dir");
    let path = temp_dir.path().join("pagewai.json");

    let mut config = Config::default();
    config.model = "qwen2.5:7b".to_string();
    config.batch_size = 4;
    config.log_level = LogLevel::Debug;
    config.save(&path).expect("save");

    let loaded = Config::load_or_create(&path).expect("load");
    assert_eq!(loaded, config);
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().expect("temp dir");
    let path = temp_dir.path().join("missing.json");

    let config = Config::load_or_create(&path).expect("created");
    assert_eq!(config, Config::default());
    assert!(path.exists());
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().expect("temp dir");
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json").expect("file");

    let result = Config::load_or_create(&path);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to parse config file"));
}
