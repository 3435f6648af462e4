//! Linux input capture via evdev.

use std::path::{Path, PathBuf};

use evdev::{Device, InputEventKind};

use crate::error::PlatformError;
use crate::platform::{InputDevice, RawKeyEvent};

use super::keycode_map::evdev_to_keycode;

/// Wraps an evdev device node, surfacing only the key transitions the core
/// understands (non-`EV_KEY` events and unmapped keycodes are dropped).
pub struct EvdevInput {
    device: Device,
    grabbed: bool,
    path: PathBuf,
}

impl EvdevInput {
    pub fn open(path: &Path) -> Result<Self, PlatformError> {
        let device = Device::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                PlatformError::NotFound(format!("{}: {e}", path.display()))
            }
            std::io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied(format!(
                "cannot access {}: permission denied (try adding your user to the 'input' group)",
                path.display()
            )),
            _ => PlatformError::Io(e),
        })?;
        Ok(Self { device, grabbed: false, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("unknown device")
    }
}

impl InputDevice for EvdevInput {
    fn next_event(&mut self) -> Result<RawKeyEvent, PlatformError> {
        loop {
            let events = self.device.fetch_events().map_err(PlatformError::Io)?;
            for ev in events {
                if let InputEventKind::Key(key) = ev.kind() {
                    let Some(code) = evdev_to_keycode(key) else { continue };
                    let pressed = match ev.value() {
                        0 => false,
                        1 => true,
                        _ => continue, // autorepeat (value 2): the core re-derives repeat itself
                    };
                    return Ok(RawKeyEvent { code, pressed });
                }
            }
        }
    }

    fn grab(&mut self) -> Result<(), PlatformError> {
        self.device.grab().map_err(PlatformError::Io)?;
        self.grabbed = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), PlatformError> {
        if self.grabbed {
            self.device.ungrab().map_err(PlatformError::Io)?;
            self.grabbed = false;
        }
        Ok(())
    }
}

impl Drop for EvdevInput {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
