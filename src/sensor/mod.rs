//! Lid angle sensor acquisition
//!
//! The lid hinge sensor is a vendor HID device exposing the angle through a
//! pollable feature report. This module finds it, validates it and decodes
//! its report. The transport itself sits behind [`HidBackend`] / [`HidDevice`]
//! so the protocol can run against real hardware (`hid` feature) or the
//! scripted [`mock`] backend.
//!
//! Wire format (report id 1, 8 byte buffer):
//!
//! | byte | meaning              |
//! |------|----------------------|
//! | 0    | report id (ignored)  |
//! | 1    | angle, low byte      |
//! | 2    | angle, high byte     |
//! | 3..8 | reserved             |

#[cfg(feature = "hid")]
pub mod hid;
pub mod mock;

use thiserror::Error;

/// Library version reported by [`version`]
pub const VERSION: &str = "1.0.0";

/// Apple vendor id
pub const VENDOR_ID: u16 = 0x05AC;
/// Lid sensor hub product id
pub const PRODUCT_ID: u16 = 0x8104;
/// HID usage page: sensor
pub const USAGE_PAGE_SENSOR: u16 = 0x0020;
/// HID usage: orientation
pub const USAGE_ORIENTATION: u16 = 0x008A;

/// Feature report carrying the angle
pub const REPORT_ID: u8 = 1;
/// Size of the feature report buffer
pub const REPORT_LEN: usize = 8;
/// Shortest report that still carries both angle bytes
pub const MIN_REPORT_LEN: usize = 3;

/// Sensor failure taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// No device matching the identity filter is attached
    #[error("lid angle sensor not supported: {0}")]
    NotSupported(String),
    /// A matching device exists but could not be opened and held
    #[error("sensor initialization failed: {0}")]
    InitializationFailure(String),
    /// A read was attempted on a sensor that has no device
    #[error("sensor is not available")]
    NotAvailable,
    /// Transport error or malformed report on a single read
    #[error("sensor read failed: {0}")]
    ReadFailure(String),
}

impl SensorError {
    /// True for per-call failures that may succeed on the next read.
    ///
    /// Everything else means the sensor will not work for this session.
    pub fn is_transient(&self) -> bool {
        matches!(self, SensorError::ReadFailure(_))
    }
}

/// One decoded angle sample (latest read wins, no history)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Raw decoded value in degrees, not range-checked
    pub angle_degrees: f64,
}

/// Identity of an attached HID device as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    /// Platform path used to open the device
    pub path: String,
}

/// The 4-tuple a device must match to be considered at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceFilter {
    /// The lid angle sensor on supported laptops
    pub const LID_ANGLE: Self = Self {
        vendor_id: VENDOR_ID,
        product_id: PRODUCT_ID,
        usage_page: USAGE_PAGE_SENSOR,
        usage: USAGE_ORIENTATION,
    };

    pub fn matches(&self, info: &DeviceInfo) -> bool {
        info.vendor_id == self.vendor_id
            && info.product_id == self.product_id
            && info.usage_page == self.usage_page
            && info.usage == self.usage
    }
}

/// An open HID device. Dropping it closes the device.
pub trait HidDevice {
    /// Read a feature report. `buf[0]` holds the report id on entry.
    ///
    /// Returns the number of bytes written into `buf`.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, SensorError>;
}

/// Device enumeration and opening
pub trait HidBackend {
    /// List every attached HID device (unfiltered is fine).
    fn enumerate(&mut self) -> Result<Vec<DeviceInfo>, SensorError>;

    /// Open a device found by [`HidBackend::enumerate`].
    fn open(&mut self, info: &DeviceInfo) -> Result<Box<dyn HidDevice>, SensorError>;
}

/// Owning handle around an open device.
///
/// The device is closed exactly once, when the handle drops, on every path
/// including a failed construction.
struct DeviceHandle {
    device: Box<dyn HidDevice>,
    path: String,
}

impl DeviceHandle {
    fn read_report(&mut self) -> Result<Vec<u8>, SensorError> {
        let mut buf = [0u8; REPORT_LEN];
        buf[0] = REPORT_ID;
        let len = self.device.get_feature_report(&mut buf)?;
        Ok(buf[..len.min(REPORT_LEN)].to_vec())
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        log::debug!("Closing HID device {}", self.path);
    }
}

/// Decode the angle from a feature report.
///
/// Bytes 1 and 2 form a little-endian u16 taken directly as degrees.
pub fn decode_report(report: &[u8]) -> Result<f64, SensorError> {
    if report.len() < MIN_REPORT_LEN {
        return Err(SensorError::ReadFailure(format!(
            "invalid report length: {} (expected >= {})",
            report.len(),
            MIN_REPORT_LEN
        )));
    }
    let raw = u16::from_le_bytes([report[1], report[2]]);
    Ok(f64::from(raw))
}

/// Build the report a device would return for `angle`
pub fn encode_report(angle: u16) -> [u8; REPORT_LEN] {
    let [lo, hi] = angle.to_le_bytes();
    let mut report = [0u8; REPORT_LEN];
    report[0] = REPORT_ID;
    report[1] = lo;
    report[2] = hi;
    report
}

/// Library version string
pub fn version() -> &'static str {
    VERSION
}

/// Lid angle sensor
///
/// Either holds an open, validated device or is unavailable. There is no
/// half-open state.
pub struct AngleSensor {
    handle: Option<DeviceHandle>,
}

impl std::fmt::Debug for AngleSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngleSensor")
            .field("device", &self.handle.as_ref().map(|h| h.path.as_str()))
            .finish()
    }
}

impl AngleSensor {
    /// Discover, validate and open the lid angle sensor.
    ///
    /// - no matching device at all: `NotSupported`
    /// - matching devices, none passes the diagnostic read: unavailable sensor
    /// - accepted device cannot be reopened and held: `InitializationFailure`
    pub fn open(backend: &mut dyn HidBackend) -> Result<Self, SensorError> {
        Self::open_with_filter(backend, DeviceFilter::LID_ANGLE)
    }

    pub fn open_with_filter(
        backend: &mut dyn HidBackend,
        filter: DeviceFilter,
    ) -> Result<Self, SensorError> {
        let candidates: Vec<DeviceInfo> = backend
            .enumerate()?
            .into_iter()
            .filter(|info| filter.matches(info))
            .collect();

        if candidates.is_empty() {
            return Err(SensorError::NotSupported(
                "lid angle sensor device not found".to_string(),
            ));
        }
        log::info!("Found {} matching device(s)", candidates.len());

        // First match wins, not best match
        let Some((index, info)) = candidates
            .iter()
            .enumerate()
            .find(|(_, info)| probe_candidate(backend, info))
        else {
            log::warn!("No matching device answered the diagnostic read");
            return Ok(Self::unavailable());
        };
        log::info!("Accepted device at index {} ({})", index, info.path);

        let device = backend.open(info).map_err(|e| {
            SensorError::InitializationFailure(format!("failed to open HID device: {e}"))
        })?;
        Ok(Self {
            handle: Some(DeviceHandle {
                device,
                path: info.path.clone(),
            }),
        })
    }

    /// A sensor with no device behind it
    pub fn unavailable() -> Self {
        Self { handle: None }
    }

    /// Whether a validated device is held open
    pub fn is_available(&self) -> bool {
        self.handle.is_some()
    }

    /// Read the current lid angle
    pub fn read_angle(&mut self) -> Result<SensorReading, SensorError> {
        let handle = self.handle.as_mut().ok_or(SensorError::NotAvailable)?;
        let report = handle.read_report()?;
        let angle_degrees = decode_report(&report)?;
        log::trace!("Lid angle {angle_degrees}");
        Ok(SensorReading { angle_degrees })
    }

    /// Whether this machine has a working lid sensor.
    ///
    /// Opens and immediately releases the device.
    pub fn is_device_supported(backend: &mut dyn HidBackend) -> bool {
        Self::open(backend).map(|s| s.is_available()).unwrap_or(false)
    }
}

/// Short-lived open plus diagnostic read; the handle closes on return.
fn probe_candidate(backend: &mut dyn HidBackend, info: &DeviceInfo) -> bool {
    let device = match backend.open(info) {
        Ok(device) => device,
        Err(e) => {
            log::debug!("Rejecting {}: {}", info.path, e);
            return false;
        }
    };
    let mut handle = DeviceHandle {
        device,
        path: info.path.clone(),
    };
    match handle.read_report() {
        Ok(report) if report.len() >= MIN_REPORT_LEN => true,
        Ok(report) => {
            log::debug!("Rejecting {}: short report ({} bytes)", info.path, report.len());
            false
        }
        Err(e) => {
            log::debug!("Rejecting {}: {}", info.path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockBackend, MockResponse};
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_little_endian() {
        let report = [REPORT_ID, 0x2C, 0x01, 0, 0, 0, 0, 0];
        assert_eq!(decode_report(&report).unwrap(), 300.0);
    }

    #[test]
    fn test_decode_ignores_report_id_and_reserved() {
        let report = [0xFF, 90, 0, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        assert_eq!(decode_report(&report).unwrap(), 90.0);
    }

    #[test]
    fn test_decode_short_report_fails() {
        for len in 0..MIN_REPORT_LEN {
            let err = decode_report(&[1u8, 2][..len.min(2)]).unwrap_err();
            assert!(err.is_transient());
        }
    }

    #[test]
    fn test_no_candidates_is_not_supported() {
        let mut backend = MockBackend::new();
        backend.add_device(MockBackend::foreign_info("keyboard"), MockResponse::Angle(10));
        let err = AngleSensor::open(&mut backend).unwrap_err();
        assert!(matches!(err, SensorError::NotSupported(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let mut backend = MockBackend::new();
        let bad = backend.add_device(MockBackend::lid_info("a"), MockResponse::Short(2));
        let good = backend.add_device(MockBackend::lid_info("b"), MockResponse::Angle(100));
        let second = backend.add_device(MockBackend::lid_info("c"), MockResponse::Angle(50));

        let mut sensor = AngleSensor::open(&mut backend).unwrap();
        assert!(sensor.is_available());
        assert_eq!(sensor.read_angle().unwrap().angle_degrees, 100.0);

        // Rejected candidate was closed again, later one never touched
        assert_eq!(bad.opens(), 1);
        assert_eq!(bad.closes(), 1);
        assert_eq!(good.opens(), 2);
        assert_eq!(good.closes(), 1);
        assert_eq!(second.opens(), 0);
    }

    #[test]
    fn test_all_candidates_rejected_is_unavailable() {
        let mut backend = MockBackend::new();
        backend.add_device(MockBackend::lid_info("a"), MockResponse::Error);
        let mut sensor = AngleSensor::open(&mut backend).unwrap();
        assert!(!sensor.is_available());
        assert_eq!(sensor.read_angle().unwrap_err(), SensorError::NotAvailable);
    }

    #[test]
    fn test_reopen_failure_is_initialization_failure() {
        let mut backend = MockBackend::new();
        let dev = backend.add_device(MockBackend::lid_info("a"), MockResponse::Angle(42));
        dev.fail_opens_after(1);
        let err = AngleSensor::open(&mut backend).unwrap_err();
        assert!(matches!(err, SensorError::InitializationFailure(_)));
        assert_eq!(dev.opens(), dev.closes());
    }

    #[test]
    fn test_drop_closes_device_once() {
        let mut backend = MockBackend::new();
        let dev = backend.add_device(MockBackend::lid_info("a"), MockResponse::Angle(42));
        let sensor = AngleSensor::open(&mut backend).unwrap();
        assert_eq!(dev.closes(), 1);
        drop(sensor);
        assert_eq!(dev.closes(), 2);
        assert_eq!(dev.opens(), 2);
    }

    #[test]
    fn test_read_failure_is_transient() {
        let mut backend = MockBackend::new();
        let dev = backend.add_device(MockBackend::lid_info("a"), MockResponse::Angle(42));
        let mut sensor = AngleSensor::open(&mut backend).unwrap();
        dev.push(MockResponse::Error);
        dev.push(MockResponse::Short(1));
        assert!(sensor.read_angle().unwrap_err().is_transient());
        assert!(sensor.read_angle().unwrap_err().is_transient());
        assert_eq!(sensor.read_angle().unwrap().angle_degrees, 42.0);
    }

    #[test]
    fn test_enumeration_failure_propagates() {
        let mut backend = MockBackend::new();
        backend.add_device(MockBackend::lid_info("a"), MockResponse::Angle(1));
        backend.fail_enumeration(SensorError::InitializationFailure("no manager".into()));
        let err = AngleSensor::open(&mut backend).unwrap_err();
        assert!(matches!(err, SensorError::InitializationFailure(_)));
    }

    #[test]
    fn test_is_device_supported() {
        let mut backend = MockBackend::new();
        assert!(!AngleSensor::is_device_supported(&mut backend));
        backend.add_device(MockBackend::lid_info("a"), MockResponse::Angle(1));
        assert!(AngleSensor::is_device_supported(&mut backend));
    }

    proptest! {
        #[test]
        fn prop_decode_recovers_every_u16(angle in any::<u16>()) {
            prop_assert_eq!(decode_report(&encode_report(angle)).unwrap(), f64::from(angle));
        }

        #[test]
        fn prop_decode_is_byte2_shl_8_or_byte1(b0 in any::<u8>(), b1 in any::<u8>(), b2 in any::<u8>()) {
            let expected = ((u32::from(b2) << 8) | u32::from(b1)) as f64;
            prop_assert_eq!(decode_report(&[b0, b1, b2]).unwrap(), expected);
        }
    }
}
