use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Item, Settings, SettingsFile};

/// Schema changes need a new key, so the version lives in the file name.
pub const TODOS_KEY: &str = "myday_todos_v1";
const SETTINGS_FILE: &str = "settings.json";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable slot for the item collection, plus the settings file next to it.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn todos_path(&self) -> PathBuf {
        self.root.join(format!("{TODOS_KEY}.json"))
    }

    pub fn ensure_dirs(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Replaces the stored collection with `items`.
    pub fn save(&self, items: &[Item]) -> Result<(), PersistenceError> {
        self.ensure_dirs()?;
        self.write_atomic(self.todos_path(), &items)
    }

    /// Stored collection, or empty when the slot is missing or unreadable.
    pub fn load(&self) -> Vec<Item> {
        let path = self.todos_path();
        if !path.exists() {
            return Vec::new();
        }
        match self.load_json::<Vec<Item>>(&path) {
            Ok(items) => items,
            Err(err) => {
                log::error!("failed to load todos from {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    pub fn clear(&self) {
        let path = self.todos_path();
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::error!("failed to clear todos at {}: {err}", path.display());
            }
        }
    }

    pub fn load_settings(&self) -> Result<Settings, PersistenceError> {
        let file: SettingsFile = self.load_json(&self.root.join(SETTINGS_FILE))?;
        Ok(file.settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.ensure_dirs()?;
        let file = SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: settings.clone(),
        };
        self.write_atomic(self.root.join(SETTINGS_FILE), &file)
    }

    fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, PersistenceError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), PersistenceError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Filter;
    use chrono::{TimeZone, Utc};

    fn make_item(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            text: format!("item-{id}"),
            is_completed: completed,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn save_then_load_returns_same_collection() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        let items = vec![make_item("b", false), make_item("a", true)];

        storage.save(&items).unwrap();
        assert_eq!(storage.load(), items);

        // Saving replaces, never appends.
        storage.save(&items[..1]).unwrap();
        assert_eq!(storage.load(), items[..1].to_vec());
    }

    #[test]
    fn stored_layout_is_a_plain_json_array_under_the_versioned_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.save(&[make_item("a", false)]).unwrap();

        let raw = fs::read_to_string(dir.path().join("myday_todos_v1.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["isCompleted"], false);
        assert!(!dir.path().join("myday_todos_v1.tmp").exists());
    }

    #[test]
    fn load_degrades_to_empty_on_missing_or_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested"));
        assert!(storage.load().is_empty());

        storage.ensure_dirs().unwrap();
        fs::write(storage.todos_path(), b"{not json").unwrap();
        assert!(storage.load().is_empty());

        fs::write(storage.todos_path(), br#"{"id":"a"}"#).unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn save_fails_when_slot_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        fs::create_dir_all(storage.todos_path()).unwrap();

        let res = storage.save(&[make_item("a", false)]);
        assert!(matches!(res, Err(PersistenceError::Io(_))));
        assert!(!dir.path().join("myday_todos_v1.tmp").exists());
    }

    #[test]
    fn clear_removes_value_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.clear();

        storage.save(&[make_item("a", false)]).unwrap();
        storage.clear();
        assert!(!storage.todos_path().exists());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn settings_round_trip_and_missing_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        assert!(storage.load_settings().is_err());

        let settings = Settings {
            remote_url: Some("https://example.test/exec".to_string()),
            request_timeout_secs: 3,
            default_filter: Filter::Completed,
        };
        storage.save_settings(&settings).unwrap();
        let loaded = storage.load_settings().unwrap();
        assert_eq!(loaded.remote_url, settings.remote_url);
        assert_eq!(loaded.request_timeout_secs, 3);
        assert_eq!(loaded.default_filter, Filter::Completed);

        let raw = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema_version"], 1);
    }
}
