//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::circle_overlaps_rect;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball in play
    Playing,
    /// Ball left the field, lives remain, waiting for a reset
    BallInactive,
    /// Lives exhausted, only a restart leaves this phase
    GameOver,
}

/// Things that happened during a tick, for presentation hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off the paddle (total hits after the bounce)
    PaddleHit { total_hits: u32 },
    /// Ball left the field (lives after the decrement)
    BallMissed { lives: u32 },
    /// Ball put back in play; `auto` when triggered by a miss
    BallReset { auto: bool },
    GameOver { final_score: u32 },
    Restarted,
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// False once the ball has passed the miss boundary
    pub active: bool,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::new(BALL_SPEED_X, BALL_SPEED_Y),
            radius: BALL_RADIUS,
            active: true,
        }
    }
}

impl Ball {
    /// Center the ball and serve it in a random diagonal direction.
    ///
    /// Speed magnitude is always the same, only the signs vary.
    pub fn reset(&mut self, rng: &mut Pcg32) {
        let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.pos = Vec2::ZERO;
        self.vel = Vec2::new(BALL_SPEED_X * sx, BALL_SPEED_Y * sy);
        self.active = true;
    }

    /// Integrate and bounce off the top, bottom and far walls
    pub fn update(&mut self, dt: f32, speed_multiplier: f32) {
        if !self.active {
            return;
        }

        self.pos += self.vel * dt * speed_multiplier;

        // Top/bottom walls
        if self.pos.y + self.radius > FIELD_TOP {
            self.vel.y = -self.vel.y;
            self.pos.y = FIELD_TOP - self.radius;
        } else if self.pos.y - self.radius < -FIELD_TOP {
            self.vel.y = -self.vel.y;
            self.pos.y = -FIELD_TOP + self.radius;
        }

        // Far wall
        if self.pos.x + self.radius > FIELD_RIGHT {
            self.vel.x = -self.vel.x;
            self.pos.x = FIELD_RIGHT - self.radius;
        }

        if self.pos.x + self.radius < MISS_BOUNDARY {
            self.active = false;
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The player's paddle, driven by the lid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Center position (x is fixed)
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub target_y: f32,
    /// Exponential approach rate
    pub speed: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PADDLE_X, 0.0),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            target_y: 0.0,
            speed: PADDLE_SPEED,
        }
    }
}

impl Paddle {
    /// Field y the paddle heads for at a given control value
    pub fn target_for(control: f64) -> f32 {
        let centered = control as f32 - 0.5;
        let amplified = centered * PADDLE_SENSITIVITY;
        (amplified * PADDLE_FIELD_SCALE).clamp(-PADDLE_LIMIT, PADDLE_LIMIT)
    }

    /// Move toward the control target (first-order approach, no snapping)
    pub fn update(&mut self, dt: f32, control: f64) {
        self.target_y = Self::target_for(control);
        let diff = self.target_y - self.pos.y;
        self.pos.y += diff * self.speed * dt;
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Ball bounding circle overlaps the paddle box
    pub fn overlaps(&self, ball: &Ball) -> bool {
        circle_overlaps_rect(ball.pos, ball.radius, self.pos, self.half_extents())
    }
}

/// Speed multiplier bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub min: f32,
    pub max: f32,
    /// Change per step command
    pub step: f32,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 3.0,
            step: 0.2,
        }
    }
}

impl SpeedLimits {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Map a slider position in [0, 1] onto the multiplier range
    pub fn from_slider(&self, position: f32) -> f32 {
        self.clamp(self.min + position * (self.max - self.min))
    }

    /// Slider fill for a multiplier, in [0, 1]
    pub fn to_slider(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Score, lives and speed for the current match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Successful paddle hits; this is also the score
    pub total_hits: u32,
    pub lives: u32,
    pub speed_multiplier: f32,
}

impl MatchState {
    pub fn new(lives: u32, speed_multiplier: f32) -> Self {
        Self {
            total_hits: 0,
            lives,
            speed_multiplier,
        }
    }

    /// Score is the hit counter, there is no separate tally
    pub fn score(&self) -> u32 {
        self.total_hits
    }

    pub fn game_over(&self) -> bool {
        self.lives == 0
    }
}

/// Complete simulation state
///
/// One instance per run; it exclusively owns the ball, paddle and match.
#[derive(Debug, Clone)]
pub struct GameState {
    pub ball: Ball,
    pub paddle: Paddle,
    pub match_state: MatchState,
    pub phase: GamePhase,
    pub speed_limits: SpeedLimits,
    pub starting_lives: u32,
    /// Events from the latest tick
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    /// New match with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, STARTING_LIVES, 0.6, SpeedLimits::default())
    }

    /// New match from loaded settings
    pub fn from_settings(seed: u64, settings: &crate::Settings) -> Self {
        Self::with_config(
            seed,
            settings.starting_lives,
            settings.initial_speed,
            settings.speed_limits(),
        )
    }

    pub fn with_config(
        seed: u64,
        starting_lives: u32,
        initial_speed: f32,
        speed_limits: SpeedLimits,
    ) -> Self {
        let starting_lives = starting_lives.max(1);
        let mut state = Self {
            ball: Ball::default(),
            paddle: Paddle::default(),
            match_state: MatchState::new(starting_lives, speed_limits.clamp(initial_speed)),
            phase: GamePhase::Playing,
            speed_limits,
            starting_lives,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.ball.reset(&mut state.rng);
        state
    }

    /// Serve a fresh ball and go back to Playing.
    ///
    /// Ignored unless the ball is out of play and the match is still on.
    pub fn reset_ball(&mut self, auto: bool) -> bool {
        if self.phase == GamePhase::GameOver || self.ball.active {
            return false;
        }
        self.ball.reset(&mut self.rng);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::BallReset { auto });
        true
    }

    /// Full match reset, only from GameOver
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.match_state.total_hits = 0;
        self.match_state.lives = self.starting_lives;
        self.ball.reset(&mut self.rng);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Restarted);
        log::info!("Game restarted with {} lives", self.starting_lives);
        true
    }

    /// Step the speed multiplier up or down, staying in bounds
    pub fn adjust_speed(&mut self, steps: i32) {
        let ms = &mut self.match_state;
        ms.speed_multiplier = self
            .speed_limits
            .clamp(ms.speed_multiplier + steps as f32 * self.speed_limits.step);
    }

    /// Set the speed multiplier from a slider position in [0, 1]
    pub fn set_speed_from_slider(&mut self, position: f32) {
        self.match_state.speed_multiplier = self.speed_limits.from_slider(position);
    }

    /// Whether the game over modal should be shown
    pub fn show_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
