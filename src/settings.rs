use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an optional JSON file that overrides the defaults.
pub const CONFIG_ENV_VAR: &str = "WHITEBOARD_CONFIG";

/// User-tunable settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    /// Initial paint color, `#rrggbb`
    pub brush_color: String,
    pub brush_width: u8,
    /// Background the canvas starts with and returns to on clear, `#rrggbb`
    pub background_color: String,
    /// Imports smaller than this in either dimension are dropped
    pub min_dimension: u32,
    /// Imports larger than this in either dimension are downscaled first
    pub max_dimension: u32,
    /// Share of the canvas an imported object may cover on each axis
    pub fit_fraction: f32,
    pub fade_in_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_color: "#000000".to_owned(),
            brush_width: 5,
            background_color: "#ffffff".to_owned(),
            min_dimension: 16,
            max_dimension: 2048,
            fit_fraction: 0.8,
            fade_in_secs: 0.4,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<Settings>(json)?.sanitized())
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the override file named by [`CONFIG_ENV_VAR`], if any.
    ///
    /// A missing or broken file is logged and the defaults are used.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        let path = std::path::PathBuf::from(path);
        match Self::from_json_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::error!("Ignoring settings file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Clamp values that would otherwise break the import policy.
    pub fn sanitized(mut self) -> Self {
        self.brush_width = self.brush_width.clamp(crate::brush::MIN_WIDTH, crate::brush::MAX_WIDTH);
        self.min_dimension = self.min_dimension.max(1);
        self.max_dimension = self.max_dimension.max(self.min_dimension);
        if !(self.fit_fraction > 0.0 && self.fit_fraction <= 1.0) {
            self.fit_fraction = 0.8;
        }
        self.fade_in_secs = self.fade_in_secs.max(0.0);
        self
    }

    pub fn background(&self) -> Color32 {
        crate::brush::parse_hex_color(&self.background_color).unwrap_or(Color32::WHITE)
    }

    pub fn brush(&self) -> Color32 {
        crate::brush::parse_hex_color(&self.brush_color).unwrap_or(Color32::BLACK)
    }
}
