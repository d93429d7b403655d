//! Deterministic puzzle simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time enters only through `Session::tick`
//! - No rendering, audio or platform dependencies

pub mod anim;
pub mod deadlock;
pub mod grid;
pub mod layout;
pub mod matcher;
pub mod refill;
pub mod session;

pub use anim::{Animator, Move, Pop, PopFrame};
pub use deadlock::{can_make_move, find_move};
pub use grid::{Cell, Coord, Grid, GridShapeError};
pub use layout::Layout;
pub use matcher::{MatchSet, find_matches, has_match, has_match_at};
pub use refill::{RefillPlan, apply_gravity, plan_gravity_and_refill};
pub use session::{GameEvent, Resolution, Session, TurnState};
