//! Application settings stored as one JSON object

use crate::config::NebulaConfig;
use crate::database::core::RecordFile;
use crate::error::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

/// Opaque settings object
pub type Settings = Map<String, Value>;

/// Settings written on first access: `{"theme": "dark"}`
pub fn default_settings() -> Settings {
    let mut settings = Map::new();
    settings.insert("theme".to_string(), Value::String("dark".to_string()));
    settings
}

pub struct SettingsStore {
    file: RecordFile<Settings>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: RecordFile::new(path, default_settings()),
        }
    }

    pub fn from_config(config: &NebulaConfig) -> Self {
        Self::new(config.settings_path())
    }

    pub fn ensure(&self) -> Result<()> {
        self.file.ensure()
    }

    pub fn load(&self) -> Result<Settings> {
        self.file.load()
    }

    /// Replace the stored settings with `settings`; keys not present are dropped
    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.file.save(settings)?;
        info!("saved settings ({} keys)", settings.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_load_returns_dark_theme() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        assert_eq!(Value::Object(store.load().unwrap()), json!({"theme": "dark"}));
    }

    #[test]
    fn test_save_is_full_replace() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let mut first = Settings::new();
        first.insert("theme".to_string(), json!("dark"));
        first.insert("fontSize".to_string(), json!(14));
        store.save(&first).unwrap();

        let mut light = Settings::new();
        light.insert("theme".to_string(), json!("light"));
        store.save(&light).unwrap();

        assert_eq!(Value::Object(store.load().unwrap()), json!({"theme": "light"}));
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = SettingsStore::new(&path);
        assert_eq!(store.load().unwrap(), default_settings());
    }
}
