//! Linux keyboard discovery via evdev capability scanning.

use std::fs;
use std::path::Path;

use evdev::{Device, EventType, Key};

use keyrx_core::Config;
use keyrx_core::runtime::Keyboard;

use super::{DeviceInfo, DiscoveryError};
use crate::platform::linux::EvdevInput;
use crate::platform::match_device;

/// A keyboard must report at least this many of the 26 letter keys to be
/// considered a keyboard rather than e.g. a volume-control device.
const MIN_REQUIRED_KEYS: usize = 20;

const REQUIRED_KEYS: &[Key] = &[
    Key::KEY_A, Key::KEY_B, Key::KEY_C, Key::KEY_D, Key::KEY_E, Key::KEY_F, Key::KEY_G,
    Key::KEY_H, Key::KEY_I, Key::KEY_J, Key::KEY_K, Key::KEY_L, Key::KEY_M, Key::KEY_N,
    Key::KEY_O, Key::KEY_P, Key::KEY_Q, Key::KEY_R, Key::KEY_S, Key::KEY_T, Key::KEY_U,
    Key::KEY_V, Key::KEY_W, Key::KEY_X, Key::KEY_Y, Key::KEY_Z,
];

fn is_keyboard(device: &Device) -> bool {
    if !device.supported_events().contains(EventType::KEY) {
        return false;
    }
    let Some(supported) = device.supported_keys() else { return false };
    REQUIRED_KEYS.iter().filter(|k| supported.contains(**k)).count() >= MIN_REQUIRED_KEYS
}

pub fn enumerate_keyboards() -> Result<Vec<DeviceInfo>, DiscoveryError> {
    let mut keyboards = Vec::new();
    for entry in fs::read_dir("/dev/input")? {
        let path = entry?.path();
        let Ok(device) = Device::open(&path) else { continue };
        if !is_keyboard(&device) {
            continue;
        }
        keyboards.push(DeviceInfo {
            path: path.to_string_lossy().into_owned(),
            name: device.name().unwrap_or("unknown device").to_string(),
            serial: device.unique_name().map(str::to_string),
            phys: device.physical_path().map(str::to_string),
        });
    }
    keyboards.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(keyboards)
}

/// One matched keyboard paired with its own dispatcher state. Layer
/// activation, held keys, and chord-in-progress state are all per-device:
/// two keyboards run fully independent copies of the core.
pub struct ManagedDevice {
    info: DeviceInfo,
    input: EvdevInput,
    keyboard: Keyboard,
}

impl ManagedDevice {
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn input_mut(&mut self) -> &mut EvdevInput {
        &mut self.input
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// A stable identifier: serial number if the device reports one,
    /// otherwise the device path.
    pub fn device_id(&self) -> String {
        device_id_for(&self.info)
    }
}

fn device_id_for(info: &DeviceInfo) -> String {
    match &info.serial {
        Some(serial) if !serial.is_empty() => format!("serial-{serial}"),
        _ => format!("path-{}", info.path),
    }
}

pub struct DeviceManager {
    devices: Vec<ManagedDevice>,
}

impl DeviceManager {
    /// Discovers keyboards matching `device_pattern` and opens each one,
    /// giving every match its own [`Keyboard`] seeded from `config`.
    pub fn discover(config: &Config, device_pattern: &str) -> Result<Self, DiscoveryError> {
        let keyboards = enumerate_keyboards()?;
        let mut devices = Vec::new();
        for info in keyboards {
            if !match_device(&info, device_pattern) {
                continue;
            }
            let Ok(input) = EvdevInput::open(Path::new(&info.path)) else { continue };
            devices.push(ManagedDevice { info, input, keyboard: Keyboard::new(config.clone()) });
        }
        if devices.is_empty() {
            return Err(DiscoveryError::NoDevicesFound);
        }
        Ok(Self { devices })
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut ManagedDevice> {
        self.devices.iter_mut()
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.devices.iter().map(ManagedDevice::device_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> DeviceInfo {
        DeviceInfo { path: "/dev/input/event3".into(), name: name.into(), serial: Some("SN1".into()), phys: None }
    }

    #[test]
    fn required_keys_cover_the_alphabet() {
        assert_eq!(REQUIRED_KEYS.len(), 26);
        assert!(MIN_REQUIRED_KEYS <= REQUIRED_KEYS.len());
    }

    #[test]
    fn device_id_prefers_serial() {
        assert_eq!(device_id_for(&info("Test KB")), "serial-SN1");
    }

    #[test]
    fn device_id_falls_back_to_path_without_serial() {
        let mut i = info("Test KB");
        i.serial = None;
        assert_eq!(device_id_for(&i), "path-/dev/input/event3");
    }
}
