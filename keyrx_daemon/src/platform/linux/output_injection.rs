//! Linux output injection via uinput.
//!
//! `UinputOutput` implements [`keyrx_core::OutputSink`] directly: it is the
//! boundary object the dispatcher calls into, not an extra adapter layer.

use std::collections::HashSet;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use uinput::Device as UInputDevice;

use keyrx_core::config::{KeyCode, Layer};
use keyrx_core::OutputSink;

use crate::error::PlatformError;

use super::keycode_map::keycode_to_uinput_key;

/// Virtual keyboard device created via `/dev/uinput`.
///
/// # udev rules
/// ```text
/// KERNEL=="uinput", MODE="0660", GROUP="uinput", OPTIONS+="static_node=uinput"
/// ```
pub struct UinputOutput {
    device: Option<UInputDevice>,
    name: String,
    held_keys: HashSet<KeyCode>,
}

impl UinputOutput {
    pub fn create(name: &str) -> Result<Self, PlatformError> {
        let device = uinput::default()
            .map_err(|e| permission_or_io(&e, "/dev/uinput"))?
            .name(name)
            .map_err(|e| PlatformError::InjectionFailed(format!("failed to set device name: {e}")))?
            .event(uinput::event::Keyboard::All)
            .map_err(|e| {
                PlatformError::InjectionFailed(format!("failed to configure keyboard events: {e}"))
            })?
            .create()
            .map_err(|e| PlatformError::InjectionFailed(format!("failed to create uinput device: {e}")))?;

        Ok(Self { device: Some(device), name: name.to_string(), held_keys: HashSet::new() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_destroyed(&self) -> bool {
        self.device.is_none()
    }

    pub fn held_keys(&self) -> &HashSet<KeyCode> {
        &self.held_keys
    }

    /// Releases any held keys then tears down the virtual device.
    pub fn destroy(&mut self) {
        let Some(mut device) = self.device.take() else { return };
        for code in self.held_keys.drain() {
            if let Some(key) = keycode_to_uinput_key(code) {
                let _ = device.release(&key);
                let _ = device.synchronize();
            }
        }
    }
}

fn permission_or_io(e: &dyn std::fmt::Display, what: &str) -> PlatformError {
    let msg = e.to_string();
    if msg.contains("Permission denied") || msg.contains("EACCES") {
        PlatformError::PermissionDenied(format!(
            "cannot access {what}: permission denied (create udev rules or run as root)"
        ))
    } else {
        PlatformError::InjectionFailed(format!("{what}: {msg}"))
    }
}

impl OutputSink for UinputOutput {
    fn send_key(&mut self, code: KeyCode, pressed: bool) {
        let Some(device) = self.device.as_mut() else { return };
        let Some(key) = keycode_to_uinput_key(code) else { return };

        let result = if pressed { device.press(&key) } else { device.release(&key) };
        if let Err(e) = result {
            log::warn!("uinput: failed to {} key {code}: {e}", if pressed { "press" } else { "release" });
            return;
        }
        if let Err(e) = device.synchronize() {
            log::warn!("uinput: failed to synchronize: {e}");
        }

        if pressed {
            self.held_keys.insert(code);
        } else {
            self.held_keys.remove(&code);
        }
    }

    fn on_layer_change(&mut self, layer: &Layer, active: bool) {
        log::debug!("layer {:?} {}", layer.name, if active { "activated" } else { "deactivated" });
    }

    fn sleep(&mut self, millis: u64) {
        thread::sleep(Duration::from_millis(millis));
    }

    fn run_command(&mut self, cmd: &str) {
        log::info!("running command macro: {cmd}");
        // Detached from the daemon's own stdio: a macro command inheriting
        // our descriptors could block waiting on a terminal we don't have.
        let result = Command::new("/bin/sh")
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match result {
            Ok(status) if !status.success() => {
                log::warn!("command macro exited with {status}: {cmd}");
            }
            Err(e) => log::warn!("failed to spawn command macro {cmd}: {e}"),
            Ok(_) => {}
        }
    }
}

impl Drop for UinputOutput {
    fn drop(&mut self) {
        self.destroy();
    }
}
