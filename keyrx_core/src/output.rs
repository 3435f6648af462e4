//! The core's only side-effecting boundary: the output sink.

use crate::config::{KeyCode, Layer};

/// Receives the logical events the core decides to emit. Implementations
/// live outside this crate (virtual-device injection, test recorders, …).
///
/// The core calls only on edges: it never calls `send_key(code, p)` when
/// `p` already matches that code's last reported state. `NOOP` and
/// `EXTERNAL_MOUSE_BUTTON` are filtered by the core before reaching here.
///
/// Implementations must tolerate reentrant calls: macro execution can be
/// invoked from inside descriptor execution, which runs inside event
/// processing, which may itself be a replay of queued events.
pub trait OutputSink {
    fn send_key(&mut self, code: KeyCode, pressed: bool);

    /// Fired once per activation/deactivation of any layer, for observers
    /// (e.g. an IPC layer-change subscriber). `active` is `true` on
    /// activation, `false` on deactivation.
    fn on_layer_change(&mut self, layer: &Layer, active: bool);

    /// Blocking delay, used by the macro executor for inter-character and
    /// inter-entry pacing (spec §5: a deliberate design choice, since
    /// upstream consumers require it). Implementations outside test code
    /// should actually sleep; the core never measures elapsed time itself.
    fn sleep(&mut self, millis: u64);

    /// Runs a `command` macro entry's shell string. The core never
    /// interprets `cmd`; it is opaque configuration data.
    fn run_command(&mut self, cmd: &str);
}
