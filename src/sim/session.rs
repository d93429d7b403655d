//! Turn flow: selection, swaps, cascades, scoring and game over
//!
//! `Session` is the only writer of the grid. A player swap is committed to the
//! grid immediately and then played out as a chain of animation phases; the
//! logic step that follows a phase runs inside the `tick` that finishes it.
//! Input is ignored from the moment a swap is committed until the resulting
//! board has been checked for remaining moves.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::anim::{Animator, Move, Pop};
use super::deadlock::can_make_move;
use super::grid::{Coord, Grid};
use super::layout::Layout;
use super::matcher::{MatchSet, find_matches};
use super::refill::plan_gravity_and_refill;
use crate::audio::SoundEffect;
use crate::settings::Settings;

/// Pipeline step waiting on the running animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Swap committed, tiles sliding into each other's cells
    Swapping { a: Coord, b: Coord },
    /// Swap made no match and was undone, tiles sliding back
    Reverting,
    /// Matched tiles shrinking away
    Popping,
    /// Survivors falling and new tiles dropping in
    Falling,
}

/// Where the turn state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the first tile
    Idle,
    /// One tile picked, waiting for the second
    Selected(Coord),
    /// Swap or cascade in progress, input ignored
    Resolving(Resolution),
    /// No swap can make a match any more
    GameOver,
}

/// Things the outside world may want to react to, drained each frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundEffect),
    /// A cascade step removed `cells` tiles (`chain` counts from 1 within a turn)
    Cleared { cells: usize, chain: u32 },
    /// Second pick was a neighbor of the same color
    SwapRejected { a: Coord, b: Coord },
    GameOver { score: u64 },
}

/// One game: board, score and turn state
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    colors: u8,
    layout: Layout,
    animator: Animator,
    rng: Pcg32,
    seed: u64,
    score: u64,
    chain: u32,
    state: TurnState,
    events: Vec<GameEvent>,
}

impl Session {
    /// Fresh game on a generated board. The opening matches resolve like any cascade.
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = Grid::generate(settings.grid_size, settings.colors, &mut rng);
        log::info!(
            "New game: seed {}, {}x{} board, {} colors",
            seed,
            settings.grid_size,
            settings.grid_size,
            settings.colors
        );
        Self::start(grid, settings, rng, seed)
    }

    /// Game on a given board (fixtures, replays). Board size comes from the grid.
    pub fn with_grid(grid: Grid, settings: &Settings, seed: u64) -> Self {
        Self::start(grid, settings, Pcg32::seed_from_u64(seed), seed)
    }

    fn start(grid: Grid, settings: &Settings, rng: Pcg32, seed: u64) -> Self {
        let layout = Layout::new(Vec2::ZERO, settings.tile_size, grid.size());
        let mut session = Self {
            grid,
            colors: settings.colors,
            layout,
            animator: Animator::new(settings.move_duration_ms, settings.pop_duration_ms),
            rng,
            seed,
            score: 0,
            chain: 0,
            state: TurnState::Idle,
            events: Vec::new(),
        };

        let matches = find_matches(&session.grid);
        if matches.is_empty() {
            session.finish_turn();
        } else {
            session.begin_cascade_step(matches);
            session.pump();
        }
        session
    }

    // === Read surface ===

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn selection(&self) -> Option<Coord> {
        match self.state {
            TurnState::Selected(at) => Some(at),
            _ => None,
        }
    }

    /// True from swap commit until the final deadlock check
    pub fn is_processing(&self) -> bool {
        matches!(self.state, TurnState::Resolving(_))
    }

    pub fn is_game_over(&self) -> bool {
        self.state == TurnState::GameOver
    }

    /// Cascade steps so far in the current (or last) turn
    pub fn chain(&self) -> u32 {
        self.chain
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Input ===

    /// A board cell was clicked
    pub fn click(&mut self, at: Coord) {
        if !self.grid.in_bounds(at) {
            self.click_outside();
            return;
        }

        match self.state {
            TurnState::Resolving(_) | TurnState::GameOver => {
                log::trace!("Click at {} ignored ({:?})", at, self.state);
            }
            TurnState::Idle => self.state = TurnState::Selected(at),
            TurnState::Selected(first) if first == at => self.state = TurnState::Idle,
            TurnState::Selected(first) if !first.is_adjacent(at) => {
                self.state = TurnState::Selected(at);
            }
            TurnState::Selected(first) => {
                if self.grid.get(first) == self.grid.get(at) {
                    log::debug!("Swap {} <-> {} rejected: same color", first, at);
                    self.events.push(GameEvent::SwapRejected { a: first, b: at });
                } else {
                    self.begin_swap(first, at);
                }
            }
        }
    }

    /// A click landed off the board: drop any pending selection
    pub fn click_outside(&mut self) {
        if let TurnState::Selected(_) = self.state {
            self.state = TurnState::Idle;
        }
    }

    /// Advance animations by `dt_ms` and run whatever logic they were holding back
    pub fn tick(&mut self, dt_ms: f32) {
        if self.animator.advance(dt_ms) {
            self.on_phase_finished();
            self.pump();
        }
    }

    // === Pipeline ===

    /// Run steps whose phase completed without being scheduled (empty batches)
    fn pump(&mut self) {
        while self.is_processing() && self.animator.is_idle() {
            self.on_phase_finished();
        }
    }

    fn on_phase_finished(&mut self) {
        let TurnState::Resolving(step) = self.state else {
            return;
        };

        match step {
            Resolution::Swapping { a, b } => {
                let matches = find_matches(&self.grid);
                if matches.is_empty() {
                    log::debug!("Swap {} <-> {} made no match, reverting", a, b);
                    let moves = self.swap_moves(a, b);
                    self.grid.swap(a, b);
                    self.events.push(GameEvent::Sound(SoundEffect::Revert));
                    self.state = TurnState::Resolving(Resolution::Reverting);
                    self.animator.begin_movement(moves);
                } else {
                    self.begin_cascade_step(matches);
                }
            }
            Resolution::Reverting => {
                self.state = TurnState::Idle;
            }
            Resolution::Popping => {
                let plan =
                    plan_gravity_and_refill(&self.grid, &self.layout, self.colors, &mut self.rng);
                self.grid = plan.grid;
                self.state = TurnState::Resolving(Resolution::Falling);
                self.animator.begin_movement(plan.moves);
            }
            Resolution::Falling => {
                let matches = find_matches(&self.grid);
                if matches.is_empty() {
                    self.finish_turn();
                } else {
                    self.begin_cascade_step(matches);
                }
            }
        }
    }

    fn begin_swap(&mut self, a: Coord, b: Coord) {
        log::debug!("Swap {} <-> {}", a, b);
        let moves = self.swap_moves(a, b);
        self.grid.swap(a, b);
        self.chain = 0;
        self.events.push(GameEvent::Sound(SoundEffect::Swap));
        self.state = TurnState::Resolving(Resolution::Swapping { a, b });
        self.animator.begin_movement(moves);
    }

    /// Each tile slides from its own cell into the other one
    fn swap_moves(&self, a: Coord, b: Coord) -> Vec<Move> {
        [(a, b), (b, a)]
            .into_iter()
            .filter_map(|(from, to)| {
                let color = self.grid.get(from)?;
                Some(Move::new(color, self.layout.cell_origin(from), to, &self.layout))
            })
            .collect()
    }

    fn begin_cascade_step(&mut self, matches: MatchSet) {
        self.chain += 1;
        self.score += matches.len() as u64;
        log::debug!(
            "Cascade step {}: {} tiles, score {}",
            self.chain,
            matches.len(),
            self.score
        );
        self.events.push(GameEvent::Cleared {
            cells: matches.len(),
            chain: self.chain,
        });

        let mut pops = Vec::with_capacity(matches.len());
        for at in matches.iter() {
            if let Some(color) = self.grid.get(at) {
                pops.push(Pop {
                    color,
                    at: self.layout.cell_origin(at),
                });
            }
            self.grid.set(at, None);
        }

        self.state = TurnState::Resolving(Resolution::Popping);
        if self.animator.begin_pop(pops) {
            self.events.push(GameEvent::Sound(SoundEffect::Pop));
        }
    }

    /// Board is stable: keep playing or end the game
    fn finish_turn(&mut self) {
        if can_make_move(&self.grid) {
            self.state = TurnState::Idle;
        } else {
            log::info!("No moves left, game over with score {}", self.score);
            self.state = TurnState::GameOver;
            self.events.push(GameEvent::Sound(SoundEffect::GameOver));
            self.events.push(GameEvent::GameOver { score: self.score });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::matcher::has_match;
    use proptest::prelude::*;

    const STEP_MS: f32 = 50.0;

    fn fixture() -> Grid {
        Grid::from_rows(&[
            [0, 0, 1, 2, 1],
            [1, 2, 0, 1, 2],
            [2, 1, 2, 0, 0],
            [0, 2, 1, 2, 1],
            [1, 0, 2, 1, 2],
        ])
    }

    /// Swapping (4,2)/(4,3) clears row 4 cols 0..3; the 3 above (3,2) then
    /// lands next to the 3 3 already at (4,3)/(4,4) and clears again.
    fn chain_fixture() -> Grid {
        Grid::from_rows(&[
            [0, 2, 4, 0, 2],
            [2, 4, 0, 2, 4],
            [4, 0, 2, 4, 0],
            [0, 2, 3, 0, 4],
            [1, 1, 3, 1, 3],
        ])
    }

    fn settings(colors: u8) -> Settings {
        Settings {
            colors,
            ..Settings::default()
        }
    }

    fn settle(session: &mut Session) {
        for _ in 0..10_000 {
            if !session.is_processing() {
                return;
            }
            session.tick(STEP_MS);
        }
        panic!("session never settled");
    }

    #[test]
    fn test_fixture_starts_idle() {
        let session = Session::with_grid(fixture(), &settings(3), 1);
        assert_eq!(session.state(), TurnState::Idle);
        assert_eq!(session.score(), 0);
        assert_eq!(session.grid(), &fixture());
    }

    #[test]
    fn test_selection_transitions() {
        let mut session = Session::with_grid(fixture(), &settings(3), 1);
        session.click(Coord::new(1, 1));
        assert_eq!(session.selection(), Some(Coord::new(1, 1)));

        // Same cell deselects
        session.click(Coord::new(1, 1));
        assert_eq!(session.state(), TurnState::Idle);

        // Non-adjacent replaces
        session.click(Coord::new(0, 0));
        session.click(Coord::new(3, 3));
        assert_eq!(session.selection(), Some(Coord::new(3, 3)));

        // Off-board clears
        session.click_outside();
        assert_eq!(session.selection(), None);
        session.click(Coord::new(2, 2));
        session.click(Coord::new(9, 9));
        assert_eq!(session.selection(), None);
        assert!(!session.is_processing());
    }

    #[test]
    fn test_same_color_neighbors_are_a_no_op() {
        let mut session = Session::with_grid(fixture(), &settings(3), 1);
        session.click(Coord::new(2, 3));
        session.click(Coord::new(2, 4));

        assert!(!session.is_processing());
        assert_eq!(session.selection(), Some(Coord::new(2, 3)));
        assert_eq!(session.grid(), &fixture());
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::SwapRejected { a: Coord::new(2, 3), b: Coord::new(2, 4) })
        );
    }

    #[test]
    fn test_swap_without_match_reverts() {
        let mut session = Session::with_grid(fixture(), &settings(3), 1);
        session.click(Coord::new(0, 1));
        session.click(Coord::new(0, 2));

        // Logic runs ahead of the animation
        assert!(session.is_processing());
        assert_eq!(session.grid().get(Coord::new(0, 1)), Some(1));
        assert_eq!(session.grid().get(Coord::new(0, 2)), Some(0));

        // Swap animation done: the revert is already committed
        session.tick(250.0);
        assert_eq!(session.state(), TurnState::Resolving(Resolution::Reverting));
        assert_eq!(session.grid(), &fixture());

        session.tick(250.0);
        assert_eq!(session.state(), TurnState::Idle);
        assert_eq!(session.grid(), &fixture());
        assert_eq!(session.score(), 0);
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn test_clicks_ignored_while_processing() {
        let mut session = Session::with_grid(fixture(), &settings(3), 1);
        session.click(Coord::new(0, 1));
        session.click(Coord::new(0, 2));

        let grid = session.grid().clone();
        let state = session.state();
        for at in [Coord::new(3, 3), Coord::new(3, 4), Coord::new(0, 1)] {
            session.click(at);
        }
        session.click_outside();
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.state(), state);
        assert_eq!(session.score(), 0);

        session.tick(250.0);
        session.click(Coord::new(4, 4));
        assert_eq!(session.state(), TurnState::Resolving(Resolution::Reverting));
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn test_successful_swap_scores_and_settles() {
        let mut session = Session::with_grid(fixture(), &settings(3), 9);
        // (1,2) down into row 2 gives 2 1 0 0 0
        session.click(Coord::new(1, 2));
        session.click(Coord::new(2, 2));
        session.tick(250.0);
        assert_eq!(session.state(), TurnState::Resolving(Resolution::Popping));
        assert!(session.score() >= 3);
        assert_eq!(session.grid().get(Coord::new(2, 4)), None);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Pop)));

        settle(&mut session);
        assert!(session.grid().is_full());
        assert!(!has_match(session.grid()));
        assert_eq!(session.is_game_over(), !can_make_move(session.grid()));
    }

    #[test]
    fn test_cascade_scores_every_step() {
        let mut session = Session::with_grid(chain_fixture(), &settings(5), 3);
        session.click(Coord::new(4, 2));
        session.click(Coord::new(4, 3));
        settle(&mut session);

        let cleared: Vec<(usize, u32)> = session
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Cleared { cells, chain } => Some((cells, chain)),
                _ => None,
            })
            .collect();

        assert!(cleared.len() >= 2, "expected a chain, got {:?}", cleared);
        assert_eq!(cleared[0], (3, 1));
        assert_eq!(cleared[1], (3, 2));
        let total: usize = cleared.iter().map(|(cells, _)| cells).sum();
        assert_eq!(session.score(), total as u64);
        assert_eq!(session.chain() as usize, cleared.len());
    }

    #[test]
    fn test_opening_matches_resolve_before_play() {
        let mut session = Session::new(&Settings::default(), 2024);
        assert!(session.is_processing());
        assert!(session.score() >= 3);

        // Input during the opening cascade is ignored
        session.click(Coord::new(0, 0));
        assert_eq!(session.selection(), None);

        settle(&mut session);
        assert!(!has_match(session.grid()));
        assert!(session.grid().is_full());
    }

    #[test]
    fn test_deadlocked_board_is_game_over() {
        let rows: Vec<Vec<u8>> = (0..6u8)
            .map(|r| (0..6u8).map(|c| (c + 2 * r) % 4).collect())
            .collect();
        let mut session = Session::with_grid(Grid::from_rows(&rows), &settings(4), 1);
        assert!(session.is_game_over());
        assert_eq!(
            session.drain_events().last(),
            Some(&GameEvent::GameOver { score: 0 })
        );

        // Sticky: nothing gets through
        session.click(Coord::new(0, 0));
        session.click(Coord::new(0, 1));
        session.tick(1000.0);
        assert!(session.is_game_over());
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = Session::new(&Settings::default(), 77);
        let mut b = Session::new(&Settings::default(), 77);
        settle(&mut a);
        settle(&mut b);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.seed(), 77);
        assert_eq!(Session::with_grid(fixture(), &settings(3), 12).seed(), 12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_turns_leave_stable_board(seed in any::<u64>(), picks in proptest::collection::vec((0usize..7, 0usize..7, 0usize..4), 1..8)) {
            let mut session = Session::new(&Settings::default(), seed);
            settle(&mut session);
            for (row, col, dir) in picks {
                if session.is_game_over() {
                    break;
                }
                let a = Coord::new(row, col);
                let (dr, dc) = [(-1, 0), (1, 0), (0, -1), (0, 1)][dir];
                let Some(b) = session.grid().neighbor(a, dr, dc) else { continue };
                let score = session.score();
                session.click_outside();
                session.click(a);
                session.click(b);
                settle(&mut session);
                prop_assert!(session.score() >= score);
                prop_assert!(session.grid().is_full());
                prop_assert!(!has_match(session.grid()));
            }
        }
    }
}
