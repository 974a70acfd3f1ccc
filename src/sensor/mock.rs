//! Scripted HID backend
//!
//! Used by tests and by the binary's demo mode. Each device keeps a queue of
//! scripted responses and falls back to a steady response when the queue is
//! empty. Open/close counts are tracked so handle pairing can be checked.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{
    DeviceInfo, HidBackend, HidDevice, PRODUCT_ID, SensorError, USAGE_ORIENTATION,
    USAGE_PAGE_SENSOR, VENDOR_ID, encode_report,
};

/// What a feature report read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResponse {
    /// Full report carrying this angle
    Angle(u16),
    /// Report truncated to this many bytes
    Short(usize),
    /// Transport error
    Error,
}

#[derive(Debug)]
struct MockState {
    queue: VecDeque<MockResponse>,
    steady: MockResponse,
    opens: u32,
    closes: u32,
    open_limit: Option<u32>,
}

/// Test-side handle to a mock device's script and counters
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    state: Rc<RefCell<MockState>>,
}

impl MockDeviceHandle {
    /// Queue a one-shot response
    pub fn push(&self, response: MockResponse) {
        self.state.borrow_mut().queue.push_back(response);
    }

    /// Replace the response used once the queue is drained
    pub fn set_steady(&self, response: MockResponse) {
        self.state.borrow_mut().steady = response;
    }

    /// Convenience for a steady angle
    pub fn set_angle(&self, angle: u16) {
        self.set_steady(MockResponse::Angle(angle));
    }

    /// Let `n` opens succeed, fail every one after
    pub fn fail_opens_after(&self, n: u32) {
        self.state.borrow_mut().open_limit = Some(n);
    }

    /// Successful opens so far
    pub fn opens(&self) -> u32 {
        self.state.borrow().opens
    }

    pub fn closes(&self) -> u32 {
        self.state.borrow().closes
    }
}

struct MockDevice {
    state: Rc<RefCell<MockState>>,
}

impl HidDevice for MockDevice {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, SensorError> {
        let response = {
            let mut state = self.state.borrow_mut();
            let steady = state.steady;
            state.queue.pop_front().unwrap_or(steady)
        };
        match response {
            MockResponse::Angle(angle) => {
                let report = encode_report(angle);
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            }
            MockResponse::Short(len) => Ok(len.min(buf.len())),
            MockResponse::Error => Err(SensorError::ReadFailure(
                "mock transport error".to_string(),
            )),
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state.borrow_mut().closes += 1;
    }
}

/// In-memory device list
#[derive(Debug, Default)]
pub struct MockBackend {
    devices: Vec<(DeviceInfo, MockDeviceHandle)>,
    enumerate_error: Option<SensorError>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of a lid sensor at `path`
    pub fn lid_info(path: &str) -> DeviceInfo {
        DeviceInfo {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            usage_page: USAGE_PAGE_SENSOR,
            usage: USAGE_ORIENTATION,
            path: path.to_string(),
        }
    }

    /// Some unrelated HID device (generic desktop keyboard)
    pub fn foreign_info(path: &str) -> DeviceInfo {
        DeviceInfo {
            vendor_id: VENDOR_ID,
            product_id: 0x0342,
            usage_page: 0x0001,
            usage: 0x0006,
            path: path.to_string(),
        }
    }

    /// Attach a device answering with `steady` by default
    pub fn add_device(&mut self, info: DeviceInfo, steady: MockResponse) -> MockDeviceHandle {
        let handle = MockDeviceHandle {
            state: Rc::new(RefCell::new(MockState {
                queue: VecDeque::new(),
                steady,
                opens: 0,
                closes: 0,
                open_limit: None,
            })),
        };
        self.devices.push((info, handle.clone()));
        handle
    }

    /// Make enumeration itself fail
    pub fn fail_enumeration(&mut self, error: SensorError) {
        self.enumerate_error = Some(error);
    }
}

impl HidBackend for MockBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceInfo>, SensorError> {
        if let Some(err) = &self.enumerate_error {
            return Err(err.clone());
        }
        Ok(self.devices.iter().map(|(info, _)| info.clone()).collect())
    }

    fn open(&mut self, info: &DeviceInfo) -> Result<Box<dyn HidDevice>, SensorError> {
        let (_, handle) = self
            .devices
            .iter()
            .find(|(candidate, _)| candidate.path == info.path)
            .ok_or_else(|| SensorError::InitializationFailure(format!("no device at {}", info.path)))?;

        let mut state = handle.state.borrow_mut();
        if state.open_limit.is_some_and(|limit| state.opens >= limit) {
            return Err(SensorError::InitializationFailure(format!(
                "open refused for {}",
                info.path
            )));
        }
        state.opens += 1;
        drop(state);

        Ok(Box::new(MockDevice {
            state: Rc::clone(&handle.state),
        }))
    }
}
