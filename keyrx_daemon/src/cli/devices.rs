//! `keyrx devices` — list evdev devices recognized as keyboards.

use serde::Serialize;

use crate::device_manager::{enumerate_keyboards, DiscoveryError};
use crate::platform::DeviceInfo;

#[derive(Debug, Serialize)]
pub struct DeviceOutput {
    pub path: String,
    pub name: String,
    pub serial: Option<String>,
}

impl From<DeviceInfo> for DeviceOutput {
    fn from(info: DeviceInfo) -> Self {
        Self { path: info.path, name: info.name, serial: info.serial }
    }
}

pub fn list_devices() -> Result<Vec<DeviceOutput>, DiscoveryError> {
    Ok(enumerate_keyboards()?.into_iter().map(DeviceOutput::from).collect())
}
