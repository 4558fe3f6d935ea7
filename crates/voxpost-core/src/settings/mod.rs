//! Persistent settings for voxpost.
//!
//! A single JSON file under the platform config directory holds the
//! post-processing options and the preset table. Loading never fails: a
//! missing or unreadable file yields defaults so the pipeline always runs.

mod post_processing;

pub use post_processing::PostProcessSettings;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::preset::PresetTable;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub post_processing: PostProcessSettings,

    #[serde(default)]
    pub presets: PresetTable,
}

impl Settings {
    /// Path of the settings file: `<config_dir>/voxpost/settings.json`
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxpost").join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    crate::verbose!(
                        "settings file {} is invalid, using defaults: {}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write settings back to disk, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("could not determine config directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert!(back.post_processing.trim_trailing_punctuation);
        assert!(!back.post_processing.ai_enabled);
        assert!(back.presets.is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.post_processing.trim_trailing_punctuation);
        assert_eq!(settings.post_processing.skip_ai_under_chars, 0);
    }
}
