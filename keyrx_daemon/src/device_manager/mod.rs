//! Device discovery and lifecycle management.
//!
//! Each matched keyboard gets its own [`keyrx_core::Keyboard`] instance: the
//! core has no concept of multiple physical devices, so the daemon fans out
//! at this layer and feeds every device's events into its own dispatcher.

use thiserror::Error;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::{enumerate_keyboards, DeviceManager, ManagedDevice};

use crate::platform::DeviceInfo;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no keyboard devices found")]
    NoDevicesFound,

    #[error("failed to access device: {0}")]
    Access(#[from] crate::error::PlatformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type KeyboardInfo = DeviceInfo;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_error_display() {
        assert_eq!(DiscoveryError::NoDevicesFound.to_string(), "no keyboard devices found");
    }
}
