//! Game settings and tunables
//!
//! Loaded from a JSON file named by `LID_PONG_SETTINGS`. Missing fields fall
//! back to defaults, so a file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::STARTING_LIVES;
use crate::sim::SpeedLimits;

/// Settings loading failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Match ===
    /// Lives at the start of every match
    pub starting_lives: u32,
    /// RNG seed for ball serves (None = time based)
    pub seed: Option<u64>,

    // === Ball speed ===
    /// Multiplier at startup
    pub initial_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Change per +/- key press
    pub speed_step: f32,

    // === Sensor ===
    /// Lid angle mapped to control 0.0 (closed)
    pub min_angle: f64,
    /// Lid angle mapped to control 1.0 (fully open)
    pub max_angle: f64,
    /// HUD lid indicator range
    pub indicator_min_angle: f64,
    pub indicator_max_angle: f64,

    // === Manual fallback ===
    /// Control value while "up" is held
    pub manual_high: f64,
    /// Control value while "down" is held
    pub manual_low: f64,

    // === Frame loop ===
    /// Largest frame delta handed to the simulation (seconds)
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            seed: None,

            initial_speed: 0.6,
            min_speed: 0.2,
            max_speed: 3.0,
            speed_step: 0.2,

            min_angle: 0.0,
            max_angle: 180.0,
            indicator_min_angle: 30.0,
            indicator_max_angle: 150.0,

            manual_high: 0.8,
            manual_low: 0.2,

            max_frame_dt: 0.1,
        }
    }
}

impl Settings {
    /// Environment variable naming the settings file
    pub const ENV_VAR: &'static str = "LID_PONG_SETTINGS";

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.validate();
        Ok(settings)
    }

    /// Load from `LID_PONG_SETTINGS`, falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(Self::ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };
        let path = Path::new(&path);
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Repair degenerate values so every range is usable
    pub fn validate(&mut self) {
        let defaults = Self::default();

        if self.starting_lives == 0 {
            self.starting_lives = defaults.starting_lives;
        }

        if !(self.min_speed > 0.0 && self.min_speed < self.max_speed) {
            self.min_speed = defaults.min_speed;
            self.max_speed = defaults.max_speed;
        }
        if !(self.speed_step > 0.0) {
            self.speed_step = defaults.speed_step;
        }
        self.initial_speed = self.initial_speed.clamp(self.min_speed, self.max_speed);

        if !(self.min_angle < self.max_angle) {
            self.min_angle = defaults.min_angle;
            self.max_angle = defaults.max_angle;
        }
        if !(self.indicator_min_angle < self.indicator_max_angle) {
            self.indicator_min_angle = defaults.indicator_min_angle;
            self.indicator_max_angle = defaults.indicator_max_angle;
        }

        self.manual_high = self.manual_high.clamp(0.0, 1.0);
        self.manual_low = self.manual_low.clamp(0.0, 1.0);

        if !(self.max_frame_dt > 0.0) {
            self.max_frame_dt = defaults.max_frame_dt;
        }
    }

    /// Speed multiplier bounds for the simulation
    pub fn speed_limits(&self) -> SpeedLimits {
        SpeedLimits {
            min: self.min_speed,
            max: self.max_speed,
            step: self.speed_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "starting_lives": 5 }"#).unwrap();
        assert_eq!(settings.starting_lives, 5);
        assert_eq!(settings.max_angle, 180.0);
        assert_eq!(settings.manual_high, 0.8);
    }

    #[test]
    fn test_validate_repairs_ranges() {
        let mut settings = Settings {
            starting_lives: 0,
            min_speed: 4.0,
            max_speed: 1.0,
            initial_speed: 9.0,
            min_angle: 90.0,
            max_angle: 10.0,
            max_frame_dt: -1.0,
            ..Default::default()
        };
        settings.validate();
        assert_eq!(settings.starting_lives, STARTING_LIVES);
        assert_eq!((settings.min_speed, settings.max_speed), (0.2, 3.0));
        assert_eq!(settings.initial_speed, 3.0);
        assert_eq!((settings.min_angle, settings.max_angle), (0.0, 180.0));
        assert_eq!(settings.max_frame_dt, 0.1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Settings::load(Path::new("/nonexistent/lid-pong.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("lid-pong-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "seed": 7, "speed_step": 0.5 }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.speed_step, 0.5);
    }

    #[test]
    fn test_load_bad_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!("lid-pong-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
