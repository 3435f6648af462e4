//! KeyRx daemon library: platform I/O, device management, and the
//! daemon/IPC/CLI plumbing built on top of `keyrx_core`.

pub mod cli;
pub mod config_loader;
#[cfg(target_os = "linux")]
pub mod daemon;
pub mod device_manager;
pub mod error;
pub mod ipc;
pub mod platform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
