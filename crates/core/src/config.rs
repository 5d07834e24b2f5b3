//! Editor configuration.
//!
//! Every setting has a built-in default. A JSON file can override any subset
//! of them; it is only read when passed explicitly and is never written back.

use crate::page_rewrite::TextPlacement;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors that can occur while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Page preview rendering and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Pixels per point at 100% zoom
    pub scale: f32,

    /// Factor applied by one zoom in / zoom out step
    pub zoom_step: f32,

    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { scale: 2.0, zoom_step: 1.2, min_zoom: 0.25, max_zoom: 5.0 }
    }
}

/// Text pane and window defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPaneConfig {
    /// Initial font size of the edit pane, in points
    pub font_size: u32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for EditorPaneConfig {
    fn default() -> Self {
        Self { font_size: 12, window_width: 1200.0, window_height: 800.0 }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub preview: PreviewConfig,

    /// Placement of text written back into pages on save
    pub text: TextPlacement,

    pub editor: EditorPaneConfig,
}

impl EditorConfig {
    /// Load a configuration file, falling back to defaults for missing keys
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        Self::from_json(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
