/*!
 * Tests for configuration loading, defaults, and validation
 */

use subsmith::app_config::{Config, TranslationMode};

use crate::common;

/// Defaults match the documented knob values
#[test]
fn test_default_config_shouldHaveDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.mode, TranslationMode::Bilingual);
    assert_eq!(config.batch.batch_size, 10);
    assert_eq!(config.batch.batch_min, 3);
    assert_eq!(config.batch.max_retries, 3);
    assert_eq!(config.batch.retry_delay_ms, 1000);
    assert_eq!(config.batch.pacing_delay_ms, 300);
    assert_eq!(config.batch.inter_batch_delay_ms, 500);
    assert_eq!(config.audio.chunk_secs, 180);
    assert_eq!(config.audio.sample_rate, 16000);
    assert_eq!(config.provider.endpoint, "https://api.openai.com/v1");
}

/// A partial config file fills missing fields with defaults
#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "mode": "english",
            "provider": { "api_key": "sk-test" },
            "batch": { "batch_size": 5 }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.mode, TranslationMode::English);
    assert_eq!(config.provider.api_key, "sk-test");
    assert_eq!(config.provider.text_model, "gpt-4o-mini");
    assert_eq!(config.batch.batch_size, 5);
    assert_eq!(config.batch.batch_min, 3);
}

/// Serialized default config round-trips
#[test]
fn test_config_jsonRoundtrip_shouldPreserveValues() {
    let mut config = Config::default();
    config.provider.api_key = "sk-roundtrip".to_string();
    config.mode = TranslationMode::Chinese;

    let json = serde_json::to_string(&config).unwrap();
    let reparsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(reparsed.mode, TranslationMode::Chinese);
    assert_eq!(reparsed.provider.api_key, "sk-roundtrip");
    assert_eq!(reparsed.batch.batch_size, config.batch.batch_size);
}

/// Validation requires an API key
#[test]
fn test_validate_withoutApiKey_shouldFail() {
    let config = Config::default();
    assert!(config.validate().is_err());
}

/// Validation rejects a zero batch size
#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.provider.api_key = "sk-test".to_string();
    config.batch.batch_size = 0;
    assert!(config.validate().is_err());
}

/// Validation rejects a minimum above the maximum
#[test]
fn test_validate_withMinAboveSize_shouldFail() {
    let mut config = Config::default();
    config.provider.api_key = "sk-test".to_string();
    config.batch.batch_size = 4;
    config.batch.batch_min = 5;
    assert!(config.validate().is_err());
}

/// A complete, coherent config validates
#[test]
fn test_validate_withApiKey_shouldPass() {
    let mut config = Config::default();
    config.provider.api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

/// Mode strings parse case-insensitively; junk is rejected
#[test]
fn test_translation_mode_fromStr_shouldParseKnownModes() {
    assert_eq!(
        "Bilingual".parse::<TranslationMode>().unwrap(),
        TranslationMode::Bilingual
    );
    assert_eq!(
        "english".parse::<TranslationMode>().unwrap(),
        TranslationMode::English
    );
    assert_eq!(
        "CHINESE".parse::<TranslationMode>().unwrap(),
        TranslationMode::Chinese
    );
    assert!("klingon".parse::<TranslationMode>().is_err());
}

/// Missing config file is an error, not a panic
#[test]
fn test_from_file_withMissingFile_shouldReturnError() {
    assert!(Config::from_file("/nonexistent/conf.json").is_err());
}
