//! Daemon lifecycle: load configuration, discover devices, install signal
//! handlers, run the event loop until shutdown.
//!
//! # Signal handling
//!
//! - **SIGTERM**/**SIGINT**: stop the event loop and exit cleanly.
//! - **SIGHUP**: the running daemon notices the flag but does not reload
//!   in-process; the supervising service manager is expected to restart it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::config_loader::load_config;
use crate::device_manager::DeviceManager;
use crate::error::DaemonError;
use crate::platform::linux::UinputOutput;

pub mod event_loop;
pub mod signals;
pub mod state;

pub use state::ReloadState;

/// Maps a [`DaemonError`] to the process exit code `main` reports.
pub fn exit_code_for(error: &DaemonError) -> u8 {
    match error {
        DaemonError::Config(_) => 1,
        DaemonError::Platform(crate::error::PlatformError::PermissionDenied(_)) => 2,
        DaemonError::Runtime(_) => 3,
        _ => 4,
    }
}

pub struct Daemon {
    config_path: PathBuf,
    device_pattern: String,
    output_name: String,
    running: Arc<AtomicBool>,
}

impl Daemon {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            device_pattern: "*".to_string(),
            output_name: "keyrx virtual keyboard".to_string(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_device_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.device_pattern = pattern.into();
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// A shared flag that a signal handler clears on SIGTERM/SIGINT.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Loads the configuration, discovers matching devices, creates the
    /// virtual output, installs signal handlers, and runs until shutdown.
    pub fn run(&self) -> Result<(), DaemonError> {
        let config = load_config(Path::new(&self.config_path))?;
        info!("loaded configuration from {}", self.config_path.display());

        let manager = DeviceManager::discover(&config, &self.device_pattern)
            .map_err(|e| DaemonError::Runtime(e.to_string()))?;
        info!("managing {} keyboard(s)", manager.device_count());

        let sink = UinputOutput::create(&self.output_name)?;

        let signal_handler =
            signals::install_signal_handlers(self.running_flag()).map_err(DaemonError::Signal)?;

        event_loop::run_event_loop(manager, sink, self.running_flag(), &signal_handler)
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_daemon_defaults_to_matching_any_device() {
        let daemon = Daemon::new("/tmp/does-not-matter.krx");
        assert_eq!(daemon.device_pattern, "*");
        assert!(daemon.running.load(Ordering::SeqCst));
    }

    #[test]
    fn request_shutdown_clears_the_running_flag() {
        let daemon = Daemon::new("/tmp/does-not-matter.krx");
        let flag = daemon.running_flag();
        daemon.request_shutdown();
        assert!(!flag.load(Ordering::SeqCst));
    }
}
