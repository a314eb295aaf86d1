//! Unit tests for the config module
//!
//! Tests cover:
//! - Defaults for every section
//! - Loading from an explicit file
//! - Derived durations and paths

use codeflux::config::{AnimationConfig, Config, StorageConfig, TutorConfig};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_load_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[tutor]
model = "gemini-2.0-flash"
timeout_secs = 12

[animation]
guided_delay_ms = 10
fast_delay_ms = 20

[storage]
path = "/tmp/codeflux-test/store.json"

[content]
quiz_questions = 5

[ui]
ascii = true
"#
    )
    .unwrap();

    let config = Config::load(file.path().to_str()).unwrap();
    assert_eq!(config.tutor.model, "gemini-2.0-flash");
    assert_eq!(config.tutor.timeout(), Duration::from_secs(12));
    assert_eq!(config.animation.guided_delay(), Duration::from_millis(10));
    assert_eq!(config.animation.fast_delay(), Duration::from_millis(20));
    assert_eq!(
        config.storage.resolved_path(),
        PathBuf::from("/tmp/codeflux-test/store.json")
    );
    assert_eq!(config.content.quiz_questions, 5);
    assert!(config.ui.ascii);
}

#[test]
fn test_load_missing_file_fails() {
    let result = Config::load(Some("/definitely/not/here/codeflux.toml"));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_toml_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tutor\nmodel = ").unwrap();
    let err = Config::load(file.path().to_str()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}

#[test]
fn test_zero_delays_are_clamped() {
    let animation = AnimationConfig {
        guided_delay_ms: 0,
        fast_delay_ms: 0,
        ..AnimationConfig::default()
    };
    assert!(animation.guided_delay() > Duration::ZERO);
    assert!(animation.fast_delay() > Duration::ZERO);

    let tutor = TutorConfig {
        timeout_secs: 0,
        ..TutorConfig::default()
    };
    assert_eq!(tutor.timeout(), Duration::from_secs(1));
}

#[test]
fn test_blank_api_key_is_no_credential() {
    let tutor = TutorConfig {
        api_key: Some("   ".into()),
        ..TutorConfig::default()
    };
    assert!(tutor.credential().is_none());
}

#[test]
fn test_default_store_path_is_under_codeflux() {
    let path = StorageConfig::default().resolved_path();
    assert!(path.ends_with("codeflux/store.json"));
}

#[test]
fn test_api_key_is_not_serialized() {
    let mut config = Config::default();
    config.tutor.api_key = Some("secret".into());
    let text = toml::to_string(&config).unwrap();
    assert!(!text.contains("secret"));
}
