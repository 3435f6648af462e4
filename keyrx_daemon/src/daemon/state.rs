//! Shared, cross-thread daemon state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks a SIGHUP-triggered configuration reload request.
#[derive(Debug, Clone, Default)]
pub struct ReloadState {
    reload_requested: Arc<AtomicBool>,
}

impl ReloadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying flag, for registering with a signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reload_requested)
    }

    /// Returns `true` if a reload was requested since the last check, and
    /// clears the flag.
    pub fn check_and_clear(&self) -> bool {
        self.reload_requested.swap(false, Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn request_reload(&self) {
        self.reload_requested.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_and_clear_resets_the_flag() {
        let state = ReloadState::new();
        assert!(!state.check_and_clear());
        state.request_reload();
        assert!(state.check_and_clear());
        assert!(!state.check_and_clear());
    }
}
