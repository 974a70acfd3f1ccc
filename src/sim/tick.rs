//! Simulation tick
//!
//! Advances the game by one frame delta. The caller clamps `dt`; the tick
//! itself performs no I/O and cannot fail.

use super::collision::resolve_paddle_hit;
use super::state::{GameEvent, GamePhase, GameState};

/// Input for a single tick
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Normalized control value in [0, 1]
    pub control: f64,
    /// Reset the ball, or restart the match after game over (edge triggered)
    pub reset: bool,
    /// Speed multiplier steps (+1 faster, -1 slower)
    pub speed_steps: i32,
    /// Speed slider drag position in [0, 1]
    pub speed_slider: Option<f32>,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            control: 0.5,
            reset: false,
            speed_steps: 0,
            speed_slider: None,
        }
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.reset {
        match state.phase {
            GamePhase::GameOver => {
                state.restart();
            }
            _ => {
                state.reset_ball(false);
            }
        }
    }

    if let Some(position) = input.speed_slider {
        state.set_speed_from_slider(position);
    }
    if input.speed_steps != 0 {
        state.adjust_speed(input.speed_steps);
    }

    // The paddle keeps following the lid even when the match is over
    state.paddle.update(dt, input.control);

    if state.phase != GamePhase::Playing {
        return;
    }

    state
        .ball
        .update(dt, state.match_state.speed_multiplier);

    if resolve_paddle_hit(&mut state.ball, &state.paddle) {
        state.match_state.total_hits += 1;
        state.events.push(GameEvent::PaddleHit {
            total_hits: state.match_state.total_hits,
        });
    }

    if !state.ball.active && state.match_state.lives > 0 {
        handle_miss(state);
    }
}

fn handle_miss(state: &mut GameState) {
    let ms = &mut state.match_state;
    ms.lives -= 1;
    state.events.push(GameEvent::BallMissed { lives: ms.lives });

    if ms.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver {
            final_score: ms.score(),
        });
        log::info!("Game over, final score {}", ms.score());
    } else {
        state.phase = GamePhase::BallInactive;
        log::debug!("Ball missed, {} lives left", ms.lives);
        state.reset_ball(true);
    }
}
