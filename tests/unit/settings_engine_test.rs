//! Unit tests for the SettingsEngine: file load/save, named assignment,
//! caller options and query overrides.

use epubreader::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use epubreader::types::settings::{ReaderAction, ReaderSettings};
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

fn engine_in(tmp: &TempDir) -> SettingsEngine {
    let path = tmp.path().join("reader.json");
    SettingsEngine::new(Some(path.to_string_lossy().to_string()))
}

#[test]
fn test_missing_file_loads_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    let settings = engine.load().unwrap();
    assert_eq!(settings, ReaderSettings::default());
}

#[test]
fn test_set_value_persists_to_disk() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    engine.set_value("nightMode", json!(true)).unwrap();
    engine.set_value("keyboard.74", json!("previous")).unwrap();

    let mut reloaded = engine_in(&tmp);
    let settings = reloaded.load().unwrap();
    assert!(settings.night_mode);
    assert_eq!(settings.keyboard.get(&74), Some(&ReaderAction::Previous));
}

#[test]
fn test_malformed_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("reader.json"), "{ not json").unwrap();
    let mut engine = engine_in(&tmp);
    assert!(engine.load().is_err());
}

#[test]
fn test_reset_restores_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    engine.set_value("maxWidth", json!(50)).unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.get_settings().max_width, 72);
    let mut reloaded = engine_in(&tmp);
    assert_eq!(reloaded.load().unwrap().max_width, 72);
}

#[rstest]
#[case("", false)]
#[case("nonexistent", false)]
#[case("history", true)]
#[case("sidebarReflow", true)]
fn test_set_value_key_validation(#[case] key: &str, #[case] accepted: bool) {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    assert_eq!(engine.set_value(key, json!(true)).is_ok(), accepted);
}

#[test]
fn test_wrong_type_leaves_settings_untouched() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    assert!(engine.set_value("pageArrows", json!("sometimes")).is_err());
    assert!(!engine.get_settings().page_arrows);
}

#[test]
fn test_options_then_query_precedence() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    engine.load().unwrap();
    engine.apply_options(&json!({"maxWidth": 60, "history": false}));
    let applied = engine.apply_query("?maxWidth=80");
    assert_eq!(applied, vec!["maxWidth"]);
    let settings = engine.into_settings();
    assert_eq!(settings.max_width, 80);
    assert!(!settings.history);
}

#[test]
fn test_config_path_override() {
    let engine = SettingsEngine::new(Some("/tmp/x/reader.json".to_string()));
    assert_eq!(engine.get_config_path(), "/tmp/x/reader.json");
    let default = SettingsEngine::new(None);
    assert!(default.get_config_path().ends_with("reader.json"));
}
