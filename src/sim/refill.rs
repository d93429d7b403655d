//! Gravity and refill planning
//!
//! After matched cells are cleared, surviving tiles fall straight down inside
//! their column and new tiles drop in from above the board to fill the gaps.
//! Planning is pure: the caller's grid is never touched, the result carries
//! both the settled grid and the moves needed to animate it.

use rand::Rng;

use super::anim::Move;
use super::grid::{Coord, Grid};
use super::layout::Layout;
use super::matcher::has_match_at;
use crate::consts::MAX_SPAWN_ATTEMPTS;

/// Outcome of one gravity + refill pass
#[derive(Debug, Clone)]
pub struct RefillPlan {
    /// Fall moves first, then spawn moves
    pub moves: Vec<Move>,
    /// Fully settled board (no empty cells)
    pub grid: Grid,
    /// Cells that received a brand-new tile
    pub spawned: Vec<Coord>,
}

/// Compact every column toward the bottom, in place.
///
/// Tiles keep their relative order; only tiles with a hole somewhere below
/// them get a move.
pub fn apply_gravity(grid: &mut Grid, layout: &Layout) -> Vec<Move> {
    let size = grid.size();
    let mut moves = Vec::new();

    for col in 0..size {
        let mut lowest_empty = size;
        for row in (0..size).rev() {
            let at = Coord::new(row, col);
            let Some(color) = grid.get(at) else {
                continue;
            };
            lowest_empty -= 1;
            if lowest_empty > row {
                let target = Coord::new(lowest_empty, col);
                moves.push(Move::new(color, layout.cell_origin(at), target, layout));
                grid.set(target, Some(color));
                grid.set(at, None);
            }
        }
    }

    moves
}

/// Pick a color for an empty cell that doesn't complete a run there
fn spawn_color<R: Rng + ?Sized>(grid: &Grid, at: Coord, colors: u8, rng: &mut R) -> u8 {
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let color = rng.random_range(0..colors);
        if !has_match_at(grid, at, color) {
            return color;
        }
    }
    if let Some(color) = (0..colors).find(|&c| !has_match_at(grid, at, c)) {
        return color;
    }
    let color = rng.random_range(0..colors);
    log::warn!("No safe spawn color at {} with {} colors, using {}", at, colors, color);
    color
}

/// Let tiles fall, then refill the board from above
pub fn plan_gravity_and_refill<R: Rng + ?Sized>(
    grid: &Grid,
    layout: &Layout,
    colors: u8,
    rng: &mut R,
) -> RefillPlan {
    let mut work = grid.clone();
    let mut moves = apply_gravity(&mut work, layout);

    let size = work.size();
    // After gravity the holes of a column are exactly its top rows
    let holes: Vec<usize> = (0..size).map(|col| size - work.column_len(col)).collect();

    let mut spawned = Vec::new();
    for at in work.coords() {
        if work.get(at).is_some() {
            continue;
        }
        let color = spawn_color(&work, at, colors, rng);
        work.set(at, Some(color));
        // Stack new tiles above the board so the column drops in together
        let start = layout.position(at.row as f32 - holes[at.col] as f32, at.col as f32);
        moves.push(Move::new(color, start, at, layout));
        spawned.push(at);
    }

    log::trace!(
        "Refill plan: {} moves, {} spawned",
        moves.len(),
        spawned.len()
    );

    RefillPlan {
        moves,
        grid: work,
        spawned,
    }
}
