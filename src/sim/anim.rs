//! Animation phases
//!
//! Game logic runs ahead of the picture: the grid already holds its final
//! state when a phase starts, and the animator only decides where and how the
//! affected tiles are drawn until the phase's fixed duration has elapsed.
//! At most one phase runs at a time and every tile in it shares one clock.

use glam::Vec2;

use super::grid::Coord;
use super::layout::Layout;
use crate::consts::POP_END_SCALE;

/// One tile sliding between two pixel positions
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub color: u8,
    pub from: Vec2,
    pub to: Vec2,
    /// Cell the tile ends up in (drawn by the move, not statically, while in flight)
    pub target: Coord,
}

impl Move {
    pub fn new(color: u8, from: Vec2, target: Coord, layout: &Layout) -> Self {
        Self {
            color,
            from,
            to: layout.cell_origin(target),
            target,
        }
    }

    /// Interpolated top-left corner at progress `t` in [0, 1]
    #[inline]
    pub fn position(&self, t: f32) -> Vec2 {
        self.from.lerp(self.to, t)
    }
}

/// A tile being removed
#[derive(Debug, Clone, PartialEq)]
pub struct Pop {
    pub color: u8,
    /// Top-left corner of the cell it occupied
    pub at: Vec2,
}

/// Draw state of a popping tile for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopFrame {
    pub color: u8,
    pub at: Vec2,
    pub scale: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
enum Phase {
    Movement(Vec<Move>),
    Pop(Vec<Pop>),
}

/// Runs one movement or pop phase at a time
#[derive(Debug, Clone)]
pub struct Animator {
    phase: Option<Phase>,
    elapsed_ms: f32,
    move_duration_ms: f32,
    pop_duration_ms: f32,
}

impl Animator {
    pub fn new(move_duration_ms: f32, pop_duration_ms: f32) -> Self {
        Self {
            phase: None,
            elapsed_ms: 0.0,
            move_duration_ms,
            pop_duration_ms,
        }
    }

    /// Start sliding tiles. Returns false (nothing scheduled) for an empty batch.
    pub fn begin_movement(&mut self, moves: Vec<Move>) -> bool {
        self.begin(Phase::Movement(moves))
    }

    /// Start shrinking and fading tiles. Returns false for an empty batch.
    pub fn begin_pop(&mut self, pops: Vec<Pop>) -> bool {
        self.begin(Phase::Pop(pops))
    }

    fn begin(&mut self, phase: Phase) -> bool {
        debug_assert!(self.phase.is_none(), "phase started while another is running");
        let empty = match &phase {
            Phase::Movement(moves) => moves.is_empty(),
            Phase::Pop(pops) => pops.is_empty(),
        };
        if empty {
            return false;
        }
        self.phase = Some(phase);
        self.elapsed_ms = 0.0;
        true
    }

    /// Advance the clock. Returns true on the call that completes the phase;
    /// the phase's tiles are dropped at that point.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.phase.is_none() {
            return false;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms >= self.duration_ms() {
            self.phase = None;
            self.elapsed_ms = 0.0;
            return true;
        }
        false
    }

    pub fn is_idle(&self) -> bool {
        self.phase.is_none()
    }

    fn duration_ms(&self) -> f32 {
        match self.phase {
            Some(Phase::Pop(_)) => self.pop_duration_ms,
            _ => self.move_duration_ms,
        }
    }

    /// Shared progress of the running phase in [0, 1] (0 when idle)
    pub fn progress(&self) -> f32 {
        if self.phase.is_none() {
            return 0.0;
        }
        let duration = self.duration_ms();
        if duration <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / duration).clamp(0.0, 1.0)
        }
    }

    /// Tiles in flight with their current top-left corner
    pub fn moving(&self) -> impl Iterator<Item = (u8, Vec2)> + '_ {
        let t = self.progress();
        let moves: &[Move] = match &self.phase {
            Some(Phase::Movement(moves)) => moves.as_slice(),
            _ => &[],
        };
        moves.iter().map(move |m| (m.color, m.position(t)))
    }

    /// Tiles being popped with their current scale and opacity
    pub fn popping(&self) -> impl Iterator<Item = PopFrame> + '_ {
        let t = self.progress();
        let pops: &[Pop] = match &self.phase {
            Some(Phase::Pop(pops)) => pops.as_slice(),
            _ => &[],
        };
        pops.iter().map(move |p| PopFrame {
            color: p.color,
            at: p.at,
            scale: 1.0 + (POP_END_SCALE - 1.0) * t,
            alpha: 1.0 - t,
        })
    }

    /// True if a tile is currently sliding into `at`
    pub fn is_moving_into(&self, at: Coord) -> bool {
        matches!(&self.phase, Some(Phase::Movement(moves)) if moves.iter().any(|m| m.target == at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(Vec2::ZERO, 10.0, 5)
    }

    #[test]
    fn test_empty_batches_schedule_nothing() {
        let mut anim = Animator::new(250.0, 200.0);
        assert!(!anim.begin_movement(Vec::new()));
        assert!(!anim.begin_pop(Vec::new()));
        assert!(anim.is_idle());
        assert!(!anim.advance(1000.0));
    }

    #[test]
    fn test_movement_interpolates_in_lockstep() {
        let l = layout();
        let mut anim = Animator::new(250.0, 200.0);
        let moves = vec![
            Move::new(1, l.cell_origin(Coord::new(0, 0)), Coord::new(0, 1), &l),
            Move::new(2, l.position(-3.0, 4.0), Coord::new(1, 4), &l),
        ];
        assert!(anim.begin_movement(moves));
        assert!(!anim.advance(125.0));
        assert!((anim.progress() - 0.5).abs() < 1e-6);

        let frames: Vec<_> = anim.moving().collect();
        assert_eq!(frames[0], (1, Vec2::new(5.0, 0.0)));
        assert_eq!(frames[1], (2, Vec2::new(40.0, -10.0)));
        assert!(anim.is_moving_into(Coord::new(1, 4)));
        assert!(!anim.is_moving_into(Coord::new(0, 0)));
        assert_eq!(anim.popping().count(), 0);

        assert!(anim.advance(125.0));
        assert!(anim.is_idle());
        assert_eq!(anim.moving().count(), 0);
        assert!(!anim.is_moving_into(Coord::new(1, 4)));
    }

    #[test]
    fn test_pop_shrinks_and_fades() {
        let mut anim = Animator::new(250.0, 200.0);
        assert!(anim.begin_pop(vec![Pop { color: 3, at: Vec2::new(20.0, 30.0) }]));
        anim.advance(100.0);
        let frame = anim.popping().next().unwrap();
        assert_eq!(frame.color, 3);
        assert!((frame.scale - 0.75).abs() < 1e-6);
        assert!((frame.alpha - 0.5).abs() < 1e-6);
        assert!(!anim.is_moving_into(Coord::new(0, 0)));

        // Pop uses its own, shorter duration
        assert!(anim.advance(100.0));
        assert_eq!(anim.popping().count(), 0);
    }

    #[test]
    fn test_phase_runs_full_duration() {
        let l = layout();
        let mut anim = Animator::new(250.0, 200.0);
        anim.begin_movement(vec![Move::new(0, Vec2::ZERO, Coord::new(1, 0), &l)]);
        for _ in 0..24 {
            assert!(!anim.advance(10.0));
        }
        assert!(anim.advance(10.0));
        // Completion is reported once
        assert!(!anim.advance(10.0));
    }

    #[test]
    fn test_zero_duration_completes_on_next_tick() {
        let l = layout();
        let mut anim = Animator::new(0.0, 0.0);
        assert!(anim.begin_movement(vec![Move::new(0, Vec2::ZERO, Coord::new(1, 0), &l)]));
        assert_eq!(anim.progress(), 1.0);
        assert!(anim.advance(0.0));
    }
}
