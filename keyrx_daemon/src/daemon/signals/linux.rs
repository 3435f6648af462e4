//! Signal handling for daemon lifecycle: SIGTERM/SIGINT for shutdown, SIGHUP
//! for configuration reload.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use crate::daemon::state::ReloadState;

#[derive(Debug)]
pub struct SignalHandler {
    reload_state: ReloadState,
}

impl SignalHandler {
    fn new(reload_state: ReloadState) -> Self {
        Self { reload_state }
    }

    /// Returns `true` if SIGHUP was received since the last check.
    pub fn check_reload(&self) -> bool {
        self.reload_state.check_and_clear()
    }
}

/// Installs SIGTERM/SIGINT (clear `running`) and SIGHUP (set the reload
/// flag) handlers.
pub fn install_signal_handlers(running: Arc<AtomicBool>) -> io::Result<SignalHandler> {
    signal_hook::flag::register(SIGTERM, Arc::clone(&running))?;
    signal_hook::flag::register(SIGINT, Arc::clone(&running))?;

    let reload_state = ReloadState::new();
    signal_hook::flag::register(SIGHUP, reload_state.flag())?;

    Ok(SignalHandler::new(reload_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn install_does_not_error() {
        let running = Arc::new(AtomicBool::new(true));
        let handler = install_signal_handlers(running.clone()).expect("install signal handlers");
        assert!(!handler.check_reload());
        assert!(running.load(Ordering::SeqCst));
    }
}
