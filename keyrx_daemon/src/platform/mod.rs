//! Platform abstraction: turns raw OS keyboard events into timestamped
//! [`keyrx_core`] key codes, and the reverse for output.
//!
//! Only Linux (evdev + uinput) is implemented; the trait split exists so a
//! second backend can be added without touching [`crate::daemon`].

pub mod common;

#[cfg(target_os = "linux")]
pub mod linux;

pub use crate::error::PlatformError;
pub use common::{match_device, DeviceInfo};

#[cfg(target_os = "linux")]
pub use linux::{EvdevInput, UinputOutput};

/// A single raw keyboard transition read from the device layer, in the
/// device's own clock (daemon assigns it a monotonic timestamp on arrival).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub code: keyrx_core::config::KeyCode,
    pub pressed: bool,
}

/// Capture side of the platform boundary.
pub trait InputDevice {
    /// Blocks until the next key transition is available.
    fn next_event(&mut self) -> Result<RawKeyEvent, PlatformError>;

    /// Takes exclusive ownership of the device so other processes stop
    /// receiving its events (Linux: `EVIOCGRAB`).
    fn grab(&mut self) -> Result<(), PlatformError>;

    fn release(&mut self) -> Result<(), PlatformError>;
}
