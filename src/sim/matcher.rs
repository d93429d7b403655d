//! Match detection
//!
//! A match is a horizontal or vertical run of `MIN_RUN` or more identical,
//! non-empty cells. Diagonals never count.

use super::grid::{Coord, Grid};
use crate::consts::MIN_RUN;

/// Set of matched coordinates (each coordinate at most once)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    size: usize,
    mask: Vec<bool>,
    cells: Vec<Coord>,
}

impl MatchSet {
    fn new(size: usize) -> Self {
        Self {
            size,
            mask: vec![false; size * size],
            cells: Vec::new(),
        }
    }

    fn insert(&mut self, at: Coord) {
        let i = at.row * self.size + at.col;
        if !self.mask[i] {
            self.mask[i] = true;
            self.cells.push(at);
        }
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size && self.mask[at.row * self.size + at.col]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }
}

/// Walk every maximal run of identical non-empty cells (length >= `MIN_RUN`)
/// along rows, then columns. The visitor gets the run's start, direction and
/// length and returns `false` to stop early.
fn scan_runs(grid: &Grid, mut visit: impl FnMut(Coord, (usize, usize), usize) -> bool) -> bool {
    let size = grid.size();
    let at = |line: usize, i: usize, horizontal: bool| {
        if horizontal { Coord::new(line, i) } else { Coord::new(i, line) }
    };

    for horizontal in [true, false] {
        let step = if horizontal { (0, 1) } else { (1, 0) };
        for line in 0..size {
            let mut i = 0;
            while i + MIN_RUN <= size {
                let Some(color) = grid.get(at(line, i, horizontal)) else {
                    i += 1;
                    continue;
                };
                let mut end = i + 1;
                while end < size && grid.get(at(line, end, horizontal)) == Some(color) {
                    end += 1;
                }
                if end - i >= MIN_RUN {
                    if !visit(at(line, i, horizontal), step, end - i) {
                        return false;
                    }
                    i = end;
                } else {
                    i += 1;
                }
            }
        }
    }
    true
}

/// All coordinates that belong to a run of three or more
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut set = MatchSet::new(grid.size());
    scan_runs(grid, |start, (dr, dc), len| {
        for k in 0..len {
            set.insert(Coord::new(start.row + dr * k, start.col + dc * k));
        }
        true
    });
    set
}

/// True if the grid holds at least one run. Allocation free, stops at the first hit.
pub fn has_match(grid: &Grid) -> bool {
    !scan_runs(grid, |_, _, _| false)
}

/// Would `color` placed at `at` sit in a run of three or more?
///
/// Counts identical committed neighbors on both sides of each axis. When a
/// board is filled in scan order the cells right of and below `at` are still
/// empty, so only the left and upper neighbors can contribute.
pub fn has_match_at(grid: &Grid, at: Coord, color: u8) -> bool {
    let run = |d_row: isize, d_col: isize| {
        let mut count = 0;
        let mut cursor = at;
        while let Some(next) = grid.neighbor(cursor, d_row, d_col) {
            if grid.get(next) != Some(color) {
                break;
            }
            count += 1;
            cursor = next;
        }
        count
    };

    1 + run(0, -1) + run(0, 1) >= MIN_RUN || 1 + run(-1, 0) + run(1, 0) >= MIN_RUN
}
