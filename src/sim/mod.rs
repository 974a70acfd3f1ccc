//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta only
//! - Seeded RNG only
//! - No sensor, rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{circle_overlaps_rect, resolve_paddle_hit};
pub use state::{Ball, GameEvent, GamePhase, GameState, MatchState, Paddle, SpeedLimits};
pub use tick::{TickInput, tick};
