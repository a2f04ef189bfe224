// Reader Settings Engine
// Loads and saves ReaderSettings, assigns individual values by name and applies
// caller options and URL query overrides on top of the stored file.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ReaderSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ReaderSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ReaderSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists reader settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ReaderSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, else `reader.json` in the platform
    /// config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("reader.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ReaderSettings::default(),
        }
    }

    /// Merges caller options (a JSON object keyed by setting name) without
    /// touching the file. Unknown or invalid entries are logged and skipped.
    pub fn apply_options(&mut self, options: &Value) {
        let Some(map) = options.as_object() else {
            tracing::warn!("reader options are not an object; ignored");
            return;
        };
        for (key, value) in map {
            if let Err(e) = assign(&mut self.settings, key, value.clone()) {
                tracing::warn!(key = %key, error = %e, "ignoring reader option");
            }
        }
    }

    /// Applies `?name=value&...` overrides to the in-memory settings.
    /// Returns the names that were applied.
    pub fn apply_query(&mut self, query: &str) -> Vec<String> {
        apply_query(&mut self.settings, query)
    }

    pub fn into_settings(self) -> ReaderSettings {
        self.settings
    }
}

/// Assigns one setting by name. A dotted key descends into nested objects
/// (`keyboard.65`). The whole settings value is re-validated afterwards.
pub fn assign(settings: &mut ReaderSettings, key: &str, value: Value) -> Result<(), SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }

    let mut json_value = serde_json::to_value(&*settings)
        .map_err(|e| SettingsError::SerializationError(format!("Failed to serialize settings: {}", e)))?;

    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = match parts.split_last() {
        Some(split) => split,
        None => return Err(SettingsError::InvalidKey(key.to_string())),
    };

    let mut current = &mut json_value;
    for part in parents {
        current = current
            .get_mut(*part)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
    }
    let map = current.as_object_mut().ok_or_else(|| {
        SettingsError::InvalidKey(format!("Cannot navigate to key '{}'", key))
    })?;
    // Nested maps (the keyboard table) accept new entries; top-level keys must exist.
    if parents.is_empty() && !map.contains_key(*last) {
        return Err(SettingsError::InvalidKey(format!(
            "Key '{}' not found in settings",
            key
        )));
    }
    map.insert(last.to_string(), value);

    *settings = serde_json::from_value(json_value).map_err(|e| {
        SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
    })?;
    Ok(())
}

/// Applies query-string overrides. Values are percent-decoded and read as
/// JSON when they parse and fit the field, else as a plain string.
pub fn apply_query(settings: &mut ReaderSettings, query: &str) -> Vec<String> {
    let query = query.trim_start_matches('?');
    let mut applied = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(raw_key);
        let text = decode(raw_value);

        let outcome = match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => assign(settings, &key, parsed)
                .or_else(|_| assign(settings, &key, Value::String(text.clone()))),
            Err(_) => assign(settings, &key, Value::String(text.clone())),
        };

        match outcome {
            Ok(()) => applied.push(key),
            Err(e) => tracing::debug!(key = %key, error = %e, "query parameter is not a setting"),
        }
    }
    applied
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

impl SettingsEngineTrait for SettingsEngine {
    /// Missing file yields defaults; a malformed file is an error.
    fn load(&mut self) -> Result<ReaderSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = ReaderSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Assigns and persists.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        assign(&mut self.settings, key, value)?;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ReaderSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
