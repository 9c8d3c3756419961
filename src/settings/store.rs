//! Settings loader/writer.
//!
//! One TOML file under the user's config directory holds everything the UI
//! persists: theme, hex-view column preferences and shortcut overrides.
//! Loading always succeeds; missing or unparseable files fall back to
//! defaults with a log message.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

fn default_theme() -> String {
    "dark".to_string()
}

fn default_hex_columns() -> usize {
    16
}

fn default_true() -> bool {
    true
}

/// Persisted application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Visual theme identifier ("dark" or "light").
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Hex panel column count when not auto-sized.
    #[serde(default = "default_hex_columns")]
    pub hex_columns: usize,
    /// Fit the hex panel column count to the window width.
    #[serde(default = "default_true")]
    pub hex_columns_auto: bool,
    /// Shortcut overrides keyed by action name; values are key-binding
    /// strings like "Space" or "Ctrl+O".
    #[serde(default)]
    pub shortcuts: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            hex_columns: default_hex_columns(),
            hex_columns_auto: true,
            shortcuts: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Path of the settings file under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gramscope").join("settings.toml"))
    }

    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                log::warn!("no config directory available, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path, falling back to defaults.
    pub fn load_from_path(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path().context("no config directory available")?;
        self.save_to_path(&path)
    }

    /// Persist settings to an explicit path, creating parent directories.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("gramscope-tests")
            .join(format!("{name}-{}", std::process::id()))
            .join("settings.toml")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load_from_path(std::path::Path::new("/nonexistent/settings.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_roundtrip() {
        let path = temp_path("roundtrip");
        let mut settings = Settings::default();
        settings.theme = "light".to_string();
        settings.hex_columns = 24;
        settings.hex_columns_auto = false;
        settings
            .shortcuts
            .insert("playpause".to_string(), "P".to_string());

        settings.save_to_path(&path).unwrap();
        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded, settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "theme = \"light\"\n").unwrap();

        let loaded = Settings::load_from_path(&path);
        assert_eq!(loaded.theme, "light");
        assert_eq!(loaded.hex_columns, 16);
        assert!(loaded.hex_columns_auto);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_garbage_file_yields_defaults() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not [valid toml").unwrap();

        assert_eq!(Settings::load_from_path(&path), Settings::default());

        let _ = fs::remove_file(&path);
    }
}
