//! Deadlock detection: is there any swap left that makes a match?

use super::grid::{Coord, Grid};
use super::matcher::has_match;

/// First adjacent pair (scan order, right before down) whose swap creates a match
///
/// Checking only the right and down neighbor of every cell visits each
/// unordered adjacent pair exactly once. Pairs of the same color are skipped:
/// swapping them leaves the board unchanged.
pub fn find_move(grid: &Grid) -> Option<(Coord, Coord)> {
    let mut work = grid.clone();
    for at in grid.coords() {
        for (d_row, d_col) in [(0, 1), (1, 0)] {
            let Some(other) = grid.neighbor(at, d_row, d_col) else {
                continue;
            };
            if grid.get(at) == grid.get(other) {
                continue;
            }
            work.swap(at, other);
            let hit = has_match(&work);
            work.swap(at, other);
            if hit {
                return Some((at, other));
            }
        }
    }
    None
}

/// True unless the board is deadlocked
pub fn can_make_move(grid: &Grid) -> bool {
    find_move(grid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::matcher::has_match_at;
    use proptest::prelude::*;

    #[test]
    fn test_finds_the_only_move() {
        // Swapping (1,2) up into row 0 completes 2 2 2
        let grid = Grid::from_rows(&[
            [2, 2, 0, 3, 4, 5],
            [6, 7, 2, 8, 9, 10],
            [11, 12, 13, 14, 15, 16],
            [17, 18, 19, 20, 21, 22],
            [23, 24, 25, 26, 27, 28],
            [29, 30, 31, 32, 33, 34],
        ]);
        assert!(can_make_move(&grid));
        assert_eq!(find_move(&grid), Some((Coord::new(0, 2), Coord::new(1, 2))));
    }

    #[test]
    fn test_move_found_for_spec_fixture() {
        let grid = Grid::from_rows(&[
            [0, 0, 1, 2, 1],
            [1, 2, 0, 1, 2],
            [2, 1, 2, 0, 0],
            [0, 2, 1, 2, 1],
            [1, 0, 2, 1, 2],
        ]);
        let (a, b) = find_move(&grid).expect("fixture has a move");
        let mut swapped = grid.clone();
        swapped.swap(a, b);
        assert!(has_match(&swapped));
    }

    #[test]
    fn test_all_distinct_colors_is_deadlocked() {
        let rows: Vec<Vec<u8>> = (0..5u8).map(|r| (0..5u8).map(|c| r * 5 + c).collect()).collect();
        let grid = Grid::from_rows(&rows);
        assert!(!can_make_move(&grid));
    }

    #[test]
    fn test_staggered_four_color_board_is_deadlocked() {
        // Columns alternate two colors, rows never repeat within four cells
        let rows: Vec<Vec<u8>> = (0..6u8)
            .map(|r| (0..6u8).map(|c| (c + 2 * r) % 4).collect())
            .collect();
        let grid = Grid::from_rows(&rows);
        assert!(!has_match(&grid));
        assert!(!can_make_move(&grid));
    }

    #[test]
    fn test_swap_check_leaves_input_untouched() {
        let grid = Grid::from_rows(&[[0, 1, 0], [1, 0, 1], [2, 2, 0]]);
        let before = grid.clone();
        let _ = can_make_move(&grid);
        assert_eq!(grid, before);
    }

    /// Brute force over every ordered adjacent swap
    fn any_swap_matches(grid: &Grid) -> bool {
        grid.coords().any(|a| {
            [(-1, 0), (1, 0), (0, -1), (0, 1)].into_iter().any(|(dr, dc)| {
                grid.neighbor(a, dr, dc).is_some_and(|b| {
                    let mut g = grid.clone();
                    g.swap(a, b);
                    has_match(&g)
                })
            })
        })
    }

    /// Fill in scan order, stepping each drawn color forward until it
    /// doesn't complete a run. Four colors always leave one free.
    fn match_free_board(cells: &[u8]) -> Grid {
        let mut grid = Grid::empty(5);
        for (at, &drawn) in Grid::empty(5).coords().zip(cells) {
            let color = (0..4)
                .map(|k| (drawn + k) % 4)
                .find(|&c| !has_match_at(&grid, at, c))
                .unwrap();
            grid.set(at, Some(color));
        }
        grid
    }

    #[test]
    fn test_constructed_boards_have_no_match() {
        let grid = match_free_board(&[0; 25]);
        assert!(grid.is_full());
        assert!(!has_match(&grid));
    }

    proptest! {
        #[test]
        fn prop_agrees_with_brute_force(cells in proptest::collection::vec(0u8..4, 25)) {
            let grid = match_free_board(&cells);
            prop_assert!(!has_match(&grid));
            prop_assert_eq!(can_make_move(&grid), any_swap_matches(&grid));
        }
    }
}
