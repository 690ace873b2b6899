//! Configuration for recordings and screenshots

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Palette, ScrollbackConfig};
use crate::reel::{CaptureConfig, GifOptions};
use crate::renderer::{RasterConfig, DEFAULT_FONT_CANDIDATES};

/// Reel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub font: FontConfig,
    /// Default colors and the 16 named colors
    pub palette: Palette,
    pub raster: RasterConfig,
    pub capture: CaptureConfig,
    pub scrollback: ScrollbackConfig,
    pub gif: GifOptions,
}

/// Font settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font size in pixels
    pub size: f32,
    /// Font files tried in order before the built-in font
    pub candidates: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size: 15.0,
            candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/mochi-reel/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(
                        path = %config_path.display(),
                        error = %e,
                        "Ignoring unreadable config"
                    ),
                }
            }
        }
        Self::default()
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("mochi-reel"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
