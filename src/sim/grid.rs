//! Board state: the square cell matrix and its coordinates
//!
//! The grid is the only mutable game state. `Session` owns the canonical copy;
//! everything else reads a `&Grid` or works on a clone.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matcher::has_match;
use crate::consts::{MAX_GENERATE_ATTEMPTS, MIN_RUN};

/// A cell holds a color index, or `None` once its tile has been removed
pub type Cell = Option<u8>;

/// Grid position (row 0 is the top row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if the two cells share an edge
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Square board of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

/// Serialized board with an unchecked cell count
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Cell>,
}

/// Cell list doesn't match the board size
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{size}x{size} grid needs {expected} cells, got {cells}")]
pub struct GridShapeError {
    pub size: usize,
    pub expected: usize,
    pub cells: usize,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridShapeError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let expected = raw.size.saturating_mul(raw.size);
        if raw.cells.len() != expected {
            return Err(GridShapeError {
                size: raw.size,
                expected,
                cells: raw.cells.len(),
            });
        }
        Ok(Self {
            size: raw.size,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// All cells empty
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a grid from literal color rows (fixtures, replays)
    ///
    /// # Panics
    /// Panics if the rows do not form a square.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let size = rows.len();
        let mut grid = Self::empty(size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            assert_eq!(values.len(), size, "row {row} has {} cells, expected {size}", values.len());
            for (col, &color) in values.iter().enumerate() {
                grid.set(Coord::new(row, col), Some(color));
            }
        }
        grid
    }

    /// Fill every cell independently with a uniformly random color
    pub fn random<R: Rng + ?Sized>(size: usize, colors: u8, rng: &mut R) -> Self {
        let cells = (0..size * size)
            .map(|_| Some(rng.random_range(0..colors)))
            .collect();
        Self { size, cells }
    }

    /// Opening board: redraw the whole grid until at least one match exists,
    /// so the first frame always has something to pop.
    pub fn generate<R: Rng + ?Sized>(size: usize, colors: u8, rng: &mut R) -> Self {
        let mut grid = Self::random(size, colors, rng);
        let mut attempts = 1;
        while !has_match(&grid) {
            if attempts >= MAX_GENERATE_ATTEMPTS {
                log::warn!(
                    "No opening match after {} boards ({}x{}, {} colors), forcing one",
                    attempts,
                    size,
                    size,
                    colors
                );
                let color = grid.get(Coord::new(0, 0)).unwrap_or(0);
                for col in 0..MIN_RUN.min(size) {
                    grid.set(Coord::new(0, col), Some(color));
                }
                break;
            }
            grid = Self::random(size, colors, rng);
            attempts += 1;
        }
        log::debug!("Generated {}x{} board in {} attempt(s)", size, size, attempts);
        grid
    }

    /// Edge length
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size
    }

    #[inline]
    fn index(&self, at: Coord) -> usize {
        debug_assert!(self.in_bounds(at), "{at} outside {}x{} grid", self.size, self.size);
        at.row * self.size + at.col
    }

    #[inline]
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[self.index(at)]
    }

    #[inline]
    pub fn set(&mut self, at: Coord, cell: Cell) {
        let i = self.index(at);
        self.cells[i] = cell;
    }

    /// Exchange the contents of two cells
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    /// Step from `at` by (d_row, d_col), or `None` if that leaves the board
    pub fn neighbor(&self, at: Coord, d_row: isize, d_col: isize) -> Option<Coord> {
        let row = at.row.checked_add_signed(d_row)?;
        let col = at.col.checked_add_signed(d_col)?;
        let next = Coord::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Every coordinate in scan order (top-to-bottom, left-to-right)
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }

    /// Rows as slices, top first
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Number of tiles (non-empty cells) in a column
    pub fn column_len(&self, col: usize) -> usize {
        (0..self.size)
            .filter(|&row| self.get(Coord::new(row, col)).is_some())
            .count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or_else(|| ".".to_string(), |c| c.to_string()))
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
