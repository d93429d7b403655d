//! Pixel placement of the board

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Coord;

/// Where the board sits on the canvas and how big a tile is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// Tile edge length in pixels
    pub tile_size: f32,
    /// Cells per side
    pub grid_size: usize,
}

impl Layout {
    pub fn new(origin: Vec2, tile_size: f32, grid_size: usize) -> Self {
        Self {
            origin,
            tile_size,
            grid_size,
        }
    }

    /// Top-left corner of a (possibly fractional or off-board) row/column
    #[inline]
    pub fn position(&self, row: f32, col: f32) -> Vec2 {
        self.origin + Vec2::new(col, row) * self.tile_size
    }

    /// Top-left corner of a cell
    #[inline]
    pub fn cell_origin(&self, at: Coord) -> Vec2 {
        self.position(at.row as f32, at.col as f32)
    }

    /// Width and height of the whole board
    pub fn board_extent(&self) -> f32 {
        self.tile_size * self.grid_size as f32
    }

    /// Cell under a canvas point, `None` outside the board
    pub fn cell_at(&self, point: Vec2) -> Option<Coord> {
        let local = (point - self.origin) / self.tile_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (row, col) = (local.y.floor() as usize, local.x.floor() as usize);
        (row < self.grid_size && col < self.grid_size).then_some(Coord::new(row, col))
    }
}
