//! Test-only helpers shared across the daemon's integration tests.

use keyrx_core::config::{KeyCode, Layer};
use keyrx_core::OutputSink;

/// Records every call the dispatcher makes, for assertions in integration
/// tests that don't need a real uinput device.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub keys: Vec<(KeyCode, bool)>,
    pub layer_changes: Vec<(String, bool)>,
    pub sleeps: Vec<u64>,
    pub commands: Vec<String>,
}

impl OutputSink for RecordingSink {
    fn send_key(&mut self, code: KeyCode, pressed: bool) {
        self.keys.push((code, pressed));
    }

    fn on_layer_change(&mut self, layer: &Layer, active: bool) {
        self.layer_changes.push((layer.name.to_string(), active));
    }

    fn sleep(&mut self, millis: u64) {
        self.sleeps.push(millis);
    }

    fn run_command(&mut self, cmd: &str) {
        self.commands.push(cmd.to_string());
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: did `code` ever reach a final, balanced down+up pair?
    pub fn pressed_then_released(&self, code: KeyCode) -> bool {
        let mut depth = 0i32;
        for &(c, pressed) in &self.keys {
            if c != code {
                continue;
            }
            depth += if pressed { 1 } else { -1 };
        }
        depth == 0 && self.keys.iter().any(|&(c, _)| c == code)
    }
}
