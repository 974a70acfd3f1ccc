//! Control input: lid sensor with a manual fallback
//!
//! [`SensorAdapter`] turns raw angles into a normalized control value and
//! swallows every sensor failure. [`InputSource`] picks between the sensor
//! and the keyboard each frame.

use serde::{Deserialize, Serialize};

use crate::Settings;
use crate::sensor::{AngleSensor, HidBackend, SensorError};

/// Unified control signal in [0, 1] (0 = minimum, 1 = maximum)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedControl {
    pub position: f64,
}

impl NormalizedControl {
    pub const CENTER: Self = Self { position: 0.5 };

    pub fn new(position: f64) -> Self {
        Self {
            position: position.clamp(0.0, 1.0),
        }
    }
}

impl Default for NormalizedControl {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Clamp an angle into `[min, max]` and rescale to [0, 1]
pub fn normalize_angle(angle: f64, min: f64, max: f64) -> f64 {
    (angle.clamp(min, max) - min) / (max - min)
}

/// Lid sensor with angle-to-control mapping and a degradation policy.
///
/// Construction failures become a permanent unavailable state, and read
/// failures leave the previous position in place.
#[derive(Debug)]
pub struct SensorAdapter {
    sensor: AngleSensor,
    current_angle: f64,
    position: f64,
    min_angle: f64,
    max_angle: f64,
}

impl SensorAdapter {
    /// Wrap the outcome of sensor construction
    pub fn new(sensor: Result<AngleSensor, SensorError>, settings: &Settings) -> Self {
        let sensor = match sensor {
            Ok(sensor) if sensor.is_available() => {
                log::info!("Lid angle sensor initialized");
                sensor
            }
            Ok(sensor) => {
                log::warn!("Lid angle sensor not available, using keyboard controls");
                sensor
            }
            Err(e) => {
                log::warn!("Failed to initialize lid angle sensor: {e}; using keyboard controls");
                AngleSensor::unavailable()
            }
        };
        Self {
            sensor,
            current_angle: 0.0,
            position: NormalizedControl::CENTER.position,
            min_angle: settings.min_angle,
            max_angle: settings.max_angle,
        }
    }

    /// Discover the sensor through `backend`
    pub fn from_backend(backend: &mut dyn HidBackend, settings: &Settings) -> Self {
        Self::new(AngleSensor::open(backend), settings)
    }

    /// Adapter with no sensor at all
    pub fn disabled(settings: &Settings) -> Self {
        Self::new(Ok(AngleSensor::unavailable()), settings)
    }

    pub fn is_available(&self) -> bool {
        self.sensor.is_available()
    }

    /// Latest raw angle in degrees (0 until the first good read)
    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    /// Latest normalized position (sticky across failed reads)
    pub fn control(&self) -> NormalizedControl {
        NormalizedControl {
            position: self.position,
        }
    }

    /// Poll the sensor once
    pub fn update(&mut self) {
        if !self.sensor.is_available() {
            return;
        }
        match self.sensor.read_angle() {
            Ok(reading) => {
                self.current_angle = reading.angle_degrees;
                self.position =
                    normalize_angle(reading.angle_degrees, self.min_angle, self.max_angle);
            }
            Err(e) => log::warn!("Failed to read lid angle: {e}"),
        }
    }
}

/// Manual up/down state for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualInput {
    pub up: bool,
    pub down: bool,
}

impl ManualInput {
    /// Fixed high/low values; up wins when both are held
    pub fn control(&self, high: f64, low: f64) -> NormalizedControl {
        if self.up {
            NormalizedControl::new(high)
        } else if self.down {
            NormalizedControl::new(low)
        } else {
            NormalizedControl::CENTER
        }
    }
}

/// Which source drove the paddle this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSource {
    Sensor,
    Manual,
}

/// One control value per frame, sensor preferred
#[derive(Debug)]
pub struct InputSource {
    adapter: SensorAdapter,
    manual_high: f64,
    manual_low: f64,
}

impl InputSource {
    pub fn new(adapter: SensorAdapter, settings: &Settings) -> Self {
        Self {
            adapter,
            manual_high: settings.manual_high,
            manual_low: settings.manual_low,
        }
    }

    /// Choose the source for this frame; nothing is cached between frames
    pub fn select(&self) -> ControlSource {
        if self.adapter.is_available() {
            ControlSource::Sensor
        } else {
            ControlSource::Manual
        }
    }

    /// Poll the sensor and produce this frame's control
    pub fn poll(&mut self, manual: ManualInput) -> (ControlSource, NormalizedControl) {
        self.adapter.update();
        let source = self.select();
        let control = match source {
            ControlSource::Sensor => self.adapter.control(),
            ControlSource::Manual => manual.control(self.manual_high, self.manual_low),
        };
        (source, control)
    }

    pub fn adapter(&self) -> &SensorAdapter {
        &self.adapter
    }

    pub fn sensor_available(&self) -> bool {
        self.adapter.is_available()
    }

    pub fn current_angle(&self) -> f64 {
        self.adapter.current_angle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::{MockBackend, MockResponse};
    use proptest::prelude::*;

    fn lid_backend(angle: u16) -> (MockBackend, crate::sensor::mock::MockDeviceHandle) {
        let mut backend = MockBackend::new();
        let dev = backend.add_device(MockBackend::lid_info("lid"), MockResponse::Angle(angle));
        (backend, dev)
    }

    #[test]
    fn test_adapter_starts_centered() {
        let adapter = SensorAdapter::disabled(&Settings::default());
        assert_eq!(adapter.control(), NormalizedControl::CENTER);
        assert!(!adapter.is_available());
    }

    #[test]
    fn test_construction_failure_is_unavailable() {
        let settings = Settings::default();
        let mut backend = MockBackend::new();
        let mut adapter = SensorAdapter::from_backend(&mut backend, &settings);
        assert!(!adapter.is_available());
        adapter.update();
        assert_eq!(adapter.control(), NormalizedControl::CENTER);
    }

    #[test]
    fn test_adapter_maps_angle() {
        let settings = Settings::default();
        let (mut backend, dev) = lid_backend(90);
        let mut adapter = SensorAdapter::from_backend(&mut backend, &settings);
        adapter.update();
        assert_eq!(adapter.current_angle(), 90.0);
        assert_eq!(adapter.control().position, 0.5);

        dev.set_angle(270);
        adapter.update();
        assert_eq!(adapter.current_angle(), 270.0);
        assert_eq!(adapter.control().position, 1.0);
    }

    #[test]
    fn test_read_failure_keeps_previous_value() {
        let settings = Settings::default();
        let (mut backend, dev) = lid_backend(45);
        let mut adapter = SensorAdapter::from_backend(&mut backend, &settings);
        adapter.update();
        assert_eq!(adapter.control().position, 0.25);

        dev.push(MockResponse::Error);
        dev.push(MockResponse::Short(2));
        adapter.update();
        adapter.update();
        assert_eq!(adapter.control().position, 0.25);
        assert_eq!(adapter.current_angle(), 45.0);
        assert!(adapter.is_available());
    }

    #[test]
    fn test_manual_fallback_values() {
        let settings = Settings::default();
        let mut input = InputSource::new(SensorAdapter::disabled(&settings), &settings);
        let up = ManualInput { up: true, down: false };
        let down = ManualInput { up: false, down: true };
        let both = ManualInput { up: true, down: true };

        assert_eq!(input.poll(up), (ControlSource::Manual, NormalizedControl::new(0.8)));
        assert_eq!(input.poll(down).1, NormalizedControl::new(0.2));
        assert_eq!(input.poll(both).1, NormalizedControl::new(0.8));
        assert_eq!(input.poll(ManualInput::default()).1, NormalizedControl::CENTER);
    }

    #[test]
    fn test_sensor_preferred_over_manual() {
        let settings = Settings::default();
        let (mut backend, _dev) = lid_backend(180);
        let adapter = SensorAdapter::from_backend(&mut backend, &settings);
        let mut input = InputSource::new(adapter, &settings);
        let (source, control) = input.poll(ManualInput { up: false, down: true });
        assert_eq!(source, ControlSource::Sensor);
        assert_eq!(control.position, 1.0);
    }

    proptest! {
        #[test]
        fn prop_normalized_stays_in_unit_range(angle in -1.0e6f64..1.0e6) {
            let position = normalize_angle(angle, 0.0, 180.0);
            prop_assert!((0.0..=1.0).contains(&position));
            if angle <= 0.0 {
                prop_assert_eq!(position, 0.0);
            }
            if angle >= 180.0 {
                prop_assert_eq!(position, 1.0);
            }
        }
    }
}
