use directories::ProjectDirs;
use image::Rgba;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::canvas::{DEFAULT_CANVAS_SIZE, DEFAULT_GRID_SPACING, clamp_canvas_size, clamp_grid_spacing};
use crate::components::colors::{DEFAULT_PALETTE, palette_from_hex};
use crate::error::SettingsError;

/// User preferences persisted between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub default_canvas_size: u32,
    pub grid_spacing: u32,
    pub palette: Vec<String>,
    /// Most recently opened or saved file.
    pub last_file: Option<PathBuf>,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_canvas_size: DEFAULT_CANVAS_SIZE,
            grid_spacing: DEFAULT_GRID_SPACING,
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            last_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/tilepaint/settings.json  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\TilePaint\config\settings.json
    /// On macOS:   ~/Library/Application Support/TilePaint/settings.json
    pub fn settings_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "TilePaint").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load from the default location. Missing or unreadable settings give
    /// the defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("settings: cannot read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<AppSettings>(&text) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("settings: {} is malformed ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Pull out-of-range values back into limits.
    fn sanitized(mut self) -> Self {
        self.default_canvas_size = clamp_canvas_size(self.default_canvas_size);
        self.grid_spacing = clamp_grid_spacing(self.grid_spacing, self.default_canvas_size);
        self
    }

    pub fn palette_colors(&self) -> Vec<Rgba<u8>> {
        palette_from_hex(&self.palette)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
