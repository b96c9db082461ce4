//! Settings file: the [`GameData`] record as pretty-printed JSON.
//!
//! A missing file is not an error. A file that does not parse as a
//! complete record is reported so the caller can fall back to defaults.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::settings::GameData;

pub const APP_DIR: &str = "blackout";
pub const FILE_NAME: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode settings: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result of [`crate::ProgressTracker::deserialize`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// No file yet; the in-memory record was left as it was.
    Missing,
    /// The stored record replaced the in-memory one.
    Loaded,
    /// The file could not be used; the record was reset to the fallback preset.
    Defaulted(PersistError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

/// Per-user data directory for the settings file.
///
/// `$XDG_DATA_HOME/blackout`, `$HOME/.local/share/blackout`,
/// `%APPDATA%\blackout`, else the working directory.
pub fn default_settings_path() -> PathBuf {
    let env_dir = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from);
    let base = env_dir("XDG_DATA_HOME")
        .or_else(|| env_dir("HOME").map(|home| home.join(".local").join("share")))
        .or_else(|| env_dir("APPDATA"));
    match base {
        Some(dir) => dir.join(APP_DIR).join(FILE_NAME),
        None => PathBuf::from(FILE_NAME),
    }
}

/// Location of the settings file. Opened fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<GameData>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistError::Parse { path: self.path.clone(), source })
    }

    /// Overwrite the file, creating parent directories as needed.
    pub fn save(&self, data: &GameData) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(data).map_err(PersistError::Encode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut file = fs::File::create(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(content.as_bytes()).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> PersistError {
        PersistError::Io { path: self.path.clone(), source }
    }
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self::new(default_settings_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));
        assert!(!file.exists());
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_dirs_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("nested").join("settings.json"));
        let mut data = GameData::default();
        data.found_keys = 2;
        data.volume_voice = -6.0;
        file.save(&data).unwrap();
        assert_eq!(file.load().unwrap(), Some(data));
    }

    #[test]
    fn output_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));
        file.save(&GameData::default()).unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("\n  \"phase\": 0"));
        assert!(text.contains("\"volume_drone\""));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));
        fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(file.load(), Err(PersistError::Parse { .. })));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));
        let mut value = serde_json::to_value(GameData::default()).unwrap();
        value["found_keys"] = serde_json::Value::String("three".into());
        fs::write(file.path(), value.to_string()).unwrap();
        assert!(matches!(file.load(), Err(PersistError::Parse { .. })));
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(default_settings_path().ends_with(FILE_NAME));
    }
}
