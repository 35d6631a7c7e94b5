//! Application configuration: where the note and record files live, plus
//! display preferences.
//!
//! Stored as a small JSON object. Older installs wrote only the note path as a
//! bare string; that format is still read and is upgraded on the next save.

use crate::core::json_file;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default note file name, created next to the configuration file.
pub const DEFAULT_NOTE_FILE: &str = "data.json";

/// Default record file name, created next to the configuration file.
pub const DEFAULT_RECORD_FILE: &str = "records.json";

/// The persisted fields, named as they appear on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    note_data_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_data_path: Option<String>,
    theme_index: i32,
    is_dark_mode: bool,
}

impl ConfigFile {
    fn parse(content: &str) -> Self {
        let content = content.trim_start_matches('\u{feff}').trim();
        if content.is_empty() {
            return Self::default();
        }
        if content.starts_with('{') {
            return serde_json::from_str(content).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable configuration: {e}");
                Self::default()
            });
        }
        // Legacy format: the whole file is the note path.
        Self {
            note_data_path: Some(content.to_string()),
            ..Self::default()
        }
    }
}

/// The application configuration, loaded once at startup and passed to
/// whoever needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    config_file: PathBuf,
    values: ConfigFile,
}

/// Returns the path to the configuration file.
///
/// - Linux: `~/.config/CyberNote/config.json`
/// - macOS: `~/Library/Application Support/CyberNote/config.json`
/// - Windows: `%APPDATA%/CyberNote/config.json`
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("CyberNote")
        .join("config.json")
}

impl AppConfig {
    /// Loads the configuration from the OS-appropriate location.
    pub fn load_default() -> Self {
        Self::load(config_file_path())
    }

    /// Loads the configuration from `config_file`; a missing or corrupt file yields defaults.
    pub fn load(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();
        let values = match fs::read_to_string(&config_file) {
            Ok(content) => ConfigFile::parse(&content),
            Err(_) => ConfigFile::default(),
        };
        Self { config_file, values }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Path of the note file.
    ///
    /// On first use without a configured path, the default path next to the
    /// configuration file is chosen and persisted. The note file is created
    /// holding an empty array if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CyberNoteError::PersistenceFailure`] if the
    /// configuration or the empty data file cannot be written.
    pub fn note_data_path(&mut self) -> Result<PathBuf> {
        let path = match configured(&self.values.note_data_path) {
            Some(path) => path,
            None => {
                let path = self.default_path(DEFAULT_NOTE_FILE);
                self.values.note_data_path = Some(path.to_string_lossy().into_owned());
                self.save()?;
                path
            }
        };
        ensure_data_file(&path)?;
        Ok(path)
    }

    /// Path of the record file; same lazy behaviour as [`AppConfig::note_data_path`].
    pub fn record_data_path(&mut self) -> Result<PathBuf> {
        let path = match configured(&self.values.record_data_path) {
            Some(path) => path,
            None => {
                let path = self.default_path(DEFAULT_RECORD_FILE);
                self.values.record_data_path = Some(path.to_string_lossy().into_owned());
                self.save()?;
                path
            }
        };
        ensure_data_file(&path)?;
        Ok(path)
    }

    /// Points the app at another note file. Blank paths are ignored.
    pub fn set_note_data_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_string_lossy();
        if path.trim().is_empty() {
            return Ok(());
        }
        self.values.note_data_path = Some(path.into_owned());
        self.save()
    }

    /// Points the app at another record file. Blank paths are ignored.
    pub fn set_record_data_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_string_lossy();
        if path.trim().is_empty() {
            return Ok(());
        }
        self.values.record_data_path = Some(path.into_owned());
        self.save()
    }

    pub fn theme_index(&self) -> i32 {
        self.values.theme_index
    }

    pub fn set_theme_index(&mut self, index: i32) -> Result<()> {
        self.values.theme_index = index;
        self.save()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.values.is_dark_mode
    }

    pub fn set_dark_mode(&mut self, dark: bool) -> Result<()> {
        self.values.is_dark_mode = dark;
        self.save()
    }

    /// Writes the configuration, creating its directory as needed.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.values)?;
        json_file::write_bytes_atomic(&self.config_file, &json, |_| Ok(()))
    }

    fn default_path(&self, file_name: &str) -> PathBuf {
        self.config_file
            .parent()
            .map_or_else(|| PathBuf::from(file_name), |dir| dir.join(file_name))
    }
}

fn configured(value: &Option<String>) -> Option<PathBuf> {
    value
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

fn ensure_data_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    json_file::write_array_atomic(path, &[])
}
