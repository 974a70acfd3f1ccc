//! Lid Pong - Pong driven by the laptop lid angle sensor
//!
//! Core modules:
//! - `sensor`: HID lid angle sensor discovery, validation and decoding
//! - `input`: Sensor adapter and manual fallback, one control value per frame
//! - `sim`: Deterministic simulation (physics, collisions, lives, game over)
//! - `driver`: Per-frame orchestration (input -> sim -> render callback)
//! - `settings`: Data-driven tunables loaded from JSON
//! - `hud`: Presentation-facing derived values

pub mod driver;
pub mod hud;
pub mod input;
pub mod sensor;
pub mod settings;
pub mod sim;

pub use driver::{FrameDriver, FrameInput, Snapshot};
pub use input::{ControlSource, InputSource, ManualInput, NormalizedControl, SensorAdapter};
pub use sensor::{AngleSensor, SensorError, SensorReading};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
///
/// The play field is in normalized device coordinates: x and y both span
/// [-1, 1], the paddle guards the left edge.
pub mod consts {
    /// Vertical wall position (top is +, bottom is -)
    pub const FIELD_TOP: f32 = 0.95;
    /// Far wall opposite the paddle
    pub const FIELD_RIGHT: f32 = 0.98;
    /// Ball is lost once its right edge passes this x
    pub const MISS_BOUNDARY: f32 = -1.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.02;
    pub const BALL_SPEED_X: f32 = 0.8;
    pub const BALL_SPEED_Y: f32 = 0.6;

    /// Paddle defaults - tall and thin, pinned near the left edge
    pub const PADDLE_X: f32 = -0.95;
    pub const PADDLE_WIDTH: f32 = 0.02;
    pub const PADDLE_HEIGHT: f32 = 0.6;
    /// Exponential approach rate toward the target (1/s)
    pub const PADDLE_SPEED: f32 = 12.0;
    /// Small lid movements become big paddle movements
    pub const PADDLE_SENSITIVITY: f32 = 4.0;
    /// Centered control value scale into field coordinates
    pub const PADDLE_FIELD_SCALE: f32 = 0.85;
    /// Paddle target is clamped to +/- this
    pub const PADDLE_LIMIT: f32 = 0.85;

    /// Vertical velocity added per unit of off-center impact
    pub const SPIN_FACTOR: f32 = 1.5;
    /// Vertical velocity is clamped to +/- this after a hit
    pub const MAX_BALL_VY: f32 = 1.2;

    /// Lives at the start of a match
    pub const STARTING_LIVES: u32 = 3;
}
