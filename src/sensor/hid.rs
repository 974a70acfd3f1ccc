//! hidapi transport for the lid sensor

use std::ffi::CString;

use hidapi::HidApi;

use super::{DeviceInfo, HidBackend, HidDevice, SensorError};

/// Real HID devices through the platform HID library
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self, SensorError> {
        let api = HidApi::new().map_err(|e| {
            SensorError::InitializationFailure(format!("failed to create HID manager: {e}"))
        })?;
        Ok(Self { api })
    }
}

impl HidDevice for hidapi::HidDevice {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, SensorError> {
        hidapi::HidDevice::get_feature_report(self, buf)
            .map_err(|e| SensorError::ReadFailure(format!("failed to read from HID device: {e}")))
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.api.refresh_devices().map_err(|e| {
            SensorError::InitializationFailure(format!("failed to enumerate HID devices: {e}"))
        })?;
        Ok(self
            .api
            .device_list()
            .map(|info| DeviceInfo {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                usage_page: info.usage_page(),
                usage: info.usage(),
                path: info.path().to_string_lossy().into_owned(),
            })
            .collect())
    }

    fn open(&mut self, info: &DeviceInfo) -> Result<Box<dyn HidDevice>, SensorError> {
        let path = CString::new(info.path.as_str())
            .map_err(|e| SensorError::InitializationFailure(format!("bad device path: {e}")))?;
        let device = self.api.open_path(&path).map_err(|e| {
            SensorError::InitializationFailure(format!("failed to open {}: {e}", info.path))
        })?;
        Ok(Box::new(device))
    }
}
