//! Signal handling, platform-gated (only Linux is implemented).

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::{install_signal_handlers, SignalHandler};
