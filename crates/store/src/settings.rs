//! Editor settings management
//!
//! Settings live in `settings.json` under the editor's data directory. A
//! missing file yields defaults; an unreadable one is logged and replaced by
//! defaults on load.

use crate::pptx::ExportOptions;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Main editor settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub history: HistorySettings,
    pub autosave: AutosaveSettings,
    /// Defaults for elements created in the editor
    pub new_elements: NewElementDefaults,
    pub export: ExportOptions,
}

/// Undo/redo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of changes kept for undo
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Autosave settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutosaveSettings {
    /// Whether a snapshot is written after every change
    pub enabled: bool,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Style and size given to newly added elements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewElementDefaults {
    pub font_family: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (hex RGB)
    pub color: String,
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
}

impl Default for NewElementDefaults {
    fn default() -> Self {
        Self {
            font_family: "Calibri".to_string(),
            font_size: 18.0,
            color: "000000".to_string(),
            width: 200.0,
            height: 100.0,
        }
    }
}

/// Settings manager for loading, saving, and updating editor settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: EditorSettings,
}

impl SettingsManager {
    /// Create a new settings manager with the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE),
            current: EditorSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub async fn load(&mut self) -> Result<&EditorSettings> {
        self.current = if tokio::fs::try_exists(&self.settings_path).await? {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            parse_or_default(&content)
        } else {
            EditorSettings::default()
        };
        Ok(&self.current)
    }

    /// Load settings synchronously (for use during startup)
    pub fn load_sync(&mut self) -> Result<&EditorSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            parse_or_default(&content)
        } else {
            EditorSettings::default()
        };
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    /// Save settings synchronously
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &EditorSettings {
        &self.current
    }

    /// Update settings and save to disk
    pub async fn update(&mut self, settings: EditorSettings) -> Result<()> {
        self.current = settings;
        self.save().await
    }

    /// Update settings synchronously
    pub fn update_sync(&mut self, settings: EditorSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Reset settings to defaults synchronously
    pub fn reset_sync(&mut self) -> Result<&EditorSettings> {
        self.current = EditorSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

fn parse_or_default(content: &str) -> EditorSettings {
    serde_json::from_str(content).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse settings file, using defaults: {}", e);
        EditorSettings::default()
    })
}
