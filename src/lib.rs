//! Match Connect - a match-3 animal connect puzzle
//!
//! Core modules:
//! - `sim`: Deterministic puzzle simulation (grid, matching, cascades, turn flow)
//! - `render`: Three-layer scene composition over a tile drawing capability
//! - `audio`: Sound effect identifiers and the Web Audio player
//! - `settings`: Validated game configuration

pub mod audio;
pub mod render;
pub mod settings;
pub mod sim;

pub use audio::SoundEffect;
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Default board edge length (cells)
    pub const DEFAULT_GRID_SIZE: usize = 7;
    /// Default number of distinct tile colors
    pub const DEFAULT_COLORS: u8 = 6;
    /// Default tile edge in pixels
    pub const DEFAULT_TILE_SIZE: f32 = 64.0;

    /// Smallest and largest supported boards
    pub const MIN_GRID_SIZE: usize = 3;
    pub const MAX_GRID_SIZE: usize = 16;
    /// Fewer than three colors can't always refill without a match
    pub const MIN_COLORS: u8 = 3;
    pub const MAX_COLORS: u8 = 8;

    /// Swap, revert, fall and spawn animations (ms)
    pub const MOVE_DURATION_MS: f32 = 250.0;
    /// Pop animation (ms)
    pub const POP_DURATION_MS: f32 = 200.0;
    /// Popping tiles shrink from full size down to this scale
    pub const POP_END_SCALE: f32 = 0.5;

    /// Shortest run that counts as a match
    pub const MIN_RUN: usize = 3;

    /// Wholesale regenerations before a match is forced into the opening board
    pub const MAX_GENERATE_ATTEMPTS: u32 = 1000;
    /// Random draws per spawned tile before scanning for a safe color
    pub const MAX_SPAWN_ATTEMPTS: u32 = 64;
}
