//! Scene composition
//!
//! The simulation never touches a drawing context. Each frame it is walked
//! into three layers of `TileSprite`s handed to a `TileCanvas`:
//! 1. settled tiles (skipping cells a moving tile is about to land in)
//! 2. tiles in flight
//! 3. popping tiles on top
//!
//! Whether a tile shows up as a sprite or a plain circle is the canvas's call.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dRenderer;

use glam::Vec2;

use crate::consts::MAX_COLORS;
use crate::sim::Session;

/// Fill colors used when a tile's sprite isn't available
pub const FALLBACK_PALETTE: [&str; MAX_COLORS as usize] = [
    "#e74c3c", "#f1c40f", "#2ecc71", "#3498db", "#9b59b6", "#e67e22", "#1abc9c", "#ecf0f1",
];

/// Asset lookup key for a tile color
pub fn sprite_key(color: u8) -> String {
    format!("tile_{color}")
}

/// Fallback fill for a tile color
pub fn fallback_color(color: u8) -> &'static str {
    FALLBACK_PALETTE[color as usize % FALLBACK_PALETTE.len()]
}

/// One tile to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    pub color: u8,
    /// Top-left corner of the (unscaled) tile cell
    pub pos: Vec2,
    /// Cell edge length
    pub size: f32,
    /// Scale around the cell center
    pub scale: f32,
    pub alpha: f32,
    /// Draw the selection ring
    pub selected: bool,
}

impl TileSprite {
    fn settled(color: u8, pos: Vec2, size: f32) -> Self {
        Self {
            color,
            pos,
            size,
            scale: 1.0,
            alpha: 1.0,
            selected: false,
        }
    }

    /// Center of the cell
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Edge length after scaling
    pub fn drawn_size(&self) -> f32 {
        self.size * self.scale
    }
}

/// Something that can put a tile on screen
pub trait TileCanvas {
    fn draw_tile(&mut self, sprite: &TileSprite);
}

/// Draw the board as it should look right now
pub fn draw_scene<C: TileCanvas + ?Sized>(session: &Session, canvas: &mut C) {
    let grid = session.grid();
    let layout = session.layout();
    let anim = session.animator();
    let selection = session.selection();
    let size = layout.tile_size;

    for at in grid.coords() {
        let Some(color) = grid.get(at) else {
            continue;
        };
        if anim.is_moving_into(at) {
            continue;
        }
        let mut sprite = TileSprite::settled(color, layout.cell_origin(at), size);
        sprite.selected = selection == Some(at);
        canvas.draw_tile(&sprite);
    }

    for (color, pos) in anim.moving() {
        canvas.draw_tile(&TileSprite::settled(color, pos, size));
    }

    for frame in anim.popping() {
        canvas.draw_tile(&TileSprite {
            scale: frame.scale,
            alpha: frame.alpha,
            ..TileSprite::settled(frame.color, frame.at, size)
        });
    }
}
