//! Integration tests for config loading from fixture files.

use std::fs;
use std::path::Path;

use johnny_decimal::config::JohnnyConfig;
use johnny_decimal::copy::OverwritePolicy;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn johnny_section_has_expected_structure() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let johnny = value.get("johnny").expect("should have johnny section");

    for key in [
        "annotate_dates",
        "copy",
        "debug",
        "execute",
        "force",
        "minimum_groupspace",
        "overwrite",
        "verbose",
    ] {
        assert!(johnny.get(key).is_some(), "Config should have johnny.{key}");
    }
}

#[test]
fn config_values_have_correct_types() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");
    let johnny = value.get("johnny").expect("should have johnny section");

    assert!(johnny.get("copy").unwrap().is_bool());
    assert!(johnny.get("annotate_dates").unwrap().is_bool());
    assert!(johnny.get("minimum_groupspace").unwrap().is_integer());
    assert!(johnny.get("overwrite").unwrap().is_str());
}

#[test]
fn sample_config_parses_into_johnny_config() {
    let config_content = read_sample_config();
    let config = JohnnyConfig::from_toml_str(&config_content).expect("should parse sample config");

    assert_eq!(config.annotate_dates, Some(true));
    assert!(!config.copy);
    assert!(!config.execute);
    assert!(!config.force);
    assert_eq!(config.minimum_groupspace, Some(10));
    assert_eq!(config.overwrite, Some(OverwritePolicy::Fail));
}
