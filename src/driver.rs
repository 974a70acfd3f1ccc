//! Frame driver
//!
//! One call per frame: measure elapsed time, pull a control value, advance
//! the simulation, hand a snapshot to the renderer.

use std::time::Instant;

use glam::Vec2;
use serde::Serialize;

use crate::Settings;
use crate::hud;
use crate::input::{ControlSource, InputSource, ManualInput};
use crate::sim::{Ball, GameEvent, GamePhase, GameState, MatchState, Paddle, TickInput, tick};

/// Raw input levels sampled by the windowing layer this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Reset ball / restart key held
    pub reset: bool,
    /// Manual fallback keys held
    pub up: bool,
    pub down: bool,
    /// Speed keys held
    pub speed_up: bool,
    pub speed_down: bool,
    /// Pointer position (NDC) while the button is held
    pub pointer: Option<Vec2>,
}

/// Previous-frame key state for edge-triggered commands
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLatch {
    reset: bool,
    speed_up: bool,
    speed_down: bool,
}

/// Commands that fired this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub reset: bool,
    pub speed_up: bool,
    pub speed_down: bool,
}

impl KeyLatch {
    /// Report keys that went down since the last frame
    pub fn update(&mut self, input: &FrameInput) -> Edges {
        let edges = Edges {
            reset: input.reset && !self.reset,
            speed_up: input.speed_up && !self.speed_up,
            speed_down: input.speed_down && !self.speed_down,
        };
        self.reset = input.reset;
        self.speed_up = input.speed_up;
        self.speed_down = input.speed_down;
        edges
    }
}

/// Read-only view of the game after a frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub ball: Ball,
    pub paddle: Paddle,
    pub match_state: MatchState,
    pub phase: GamePhase,
    pub events: Vec<GameEvent>,
    /// Latest raw lid angle in degrees
    pub sensor_angle: f64,
    pub sensor_available: bool,
    pub control_source: ControlSource,
    /// Frame delta handed to the simulation
    pub dt: f32,
}

impl Snapshot {
    pub fn score(&self) -> u32 {
        self.match_state.score()
    }

    pub fn lives(&self) -> u32 {
        self.match_state.lives
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.match_state.speed_multiplier
    }
}

/// Per-frame orchestration
#[derive(Debug)]
pub struct FrameDriver {
    input: InputSource,
    state: GameState,
    latch: KeyLatch,
    last_time: Option<Instant>,
    max_frame_dt: f32,
    last_source: ControlSource,
}

impl FrameDriver {
    pub fn new(input: InputSource, state: GameState, settings: &Settings) -> Self {
        let last_source = input.select();
        Self {
            input,
            state,
            latch: KeyLatch::default(),
            last_time: None,
            max_frame_dt: settings.max_frame_dt,
            last_source,
        }
    }

    /// Run one frame at the current time
    pub fn tick<F: FnOnce(&Snapshot)>(&mut self, input: &FrameInput, render: F) {
        self.tick_at(Instant::now(), input, render);
    }

    /// Run one frame at `now`; the first frame has zero elapsed time
    pub fn tick_at<F: FnOnce(&Snapshot)>(&mut self, now: Instant, input: &FrameInput, render: F) {
        let elapsed = self
            .last_time
            .map(|prev| now.saturating_duration_since(prev).as_secs_f32())
            .unwrap_or(0.0);
        self.last_time = Some(now);
        let dt = elapsed.clamp(0.0, self.max_frame_dt);

        let edges = self.latch.update(input);
        let manual = ManualInput {
            up: input.up,
            down: input.down,
        };
        let (source, control) = self.input.poll(manual);
        if source != self.last_source {
            log::info!("Control source switched to {source:?}");
            self.last_source = source;
        }

        let tick_input = TickInput {
            control: control.position,
            reset: edges.reset,
            speed_steps: i32::from(edges.speed_up) - i32::from(edges.speed_down),
            speed_slider: input.pointer.and_then(hud::speed_slider_position),
        };
        tick(&mut self.state, &tick_input, dt);

        render(&self.snapshot_with_dt(dt));
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_with_dt(0.0)
    }

    fn snapshot_with_dt(&self, dt: f32) -> Snapshot {
        Snapshot {
            ball: self.state.ball.clone(),
            paddle: self.state.paddle.clone(),
            match_state: self.state.match_state.clone(),
            phase: self.state.phase,
            events: self.state.events.clone(),
            sensor_angle: self.input.current_angle(),
            sensor_available: self.input.sensor_available(),
            control_source: self.last_source,
            dt,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
