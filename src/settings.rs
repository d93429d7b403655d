//! Game settings
//!
//! Board shape, animation timing and audio levels. Any subset of fields can be
//! given as JSON (e.g. from a `data-settings` attribute on the canvas); missing
//! fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a settings blob was refused
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid size {0} outside {min}..={max}", min = MIN_GRID_SIZE, max = MAX_GRID_SIZE)]
    GridSize(usize),
    #[error("color count {0} outside {min}..={max}", min = MIN_COLORS, max = MAX_COLORS)]
    Colors(u8),
    #[error("tile size must be positive, got {0}")]
    TileSize(f32),
    #[error("{name} must not be negative, got {value}")]
    Duration { name: &'static str, value: f32 },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Board ===
    /// Cells per side
    pub grid_size: usize,
    /// Distinct tile colors
    pub colors: u8,
    /// Tile edge in CSS pixels
    pub tile_size: f32,

    // === Animation ===
    /// Swap, revert, fall and spawn duration
    pub move_duration_ms: f32,
    /// Pop duration
    pub pop_duration_ms: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            colors: DEFAULT_COLORS,
            tile_size: DEFAULT_TILE_SIZE,

            move_duration_ms: MOVE_DURATION_MS,
            pop_duration_ms: POP_DURATION_MS,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse and validate a JSON settings blob
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check ranges the simulation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(SettingsError::GridSize(self.grid_size));
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.colors) {
            return Err(SettingsError::Colors(self.colors));
        }
        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(SettingsError::TileSize(self.tile_size));
        }
        for (name, value) in [
            ("move_duration_ms", self.move_duration_ms),
            ("pop_duration_ms", self.pop_duration_ms),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(SettingsError::Duration { name, value });
            }
        }
        Ok(())
    }

    /// Parse settings, falling back to defaults (with a warning) on any problem
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings: {:?}", settings);
                settings
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Effective sound effect volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }
}
