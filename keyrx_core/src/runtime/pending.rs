//! Pending-key resolver: single-slot tap-vs-hold disambiguator (spec §4.6).

use crate::config::{Descriptor, KeyCode};
use crate::runtime::KeyEvent;
use arrayvec::ArrayVec;

pub const PENDING_QUEUE_CAP: usize = 32;

/// Resolution policy for an armed pending key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingBehaviour {
    InterruptAction1,
    InterruptAction2,
    Uninterruptible,
    UninterruptibleTapAction2,
}

#[derive(Debug, Clone)]
struct Armed {
    code: KeyCode,
    dl: u16,
    expire: u64,
    tap_expiry: Option<u64>,
    behaviour: PendingBehaviour,
    action1: Descriptor,
    action2: Descriptor,
    queue: ArrayVec<KeyEvent, PENDING_QUEUE_CAP>,
}

/// What the caller should do after feeding an event to the resolver.
pub enum PendingOutcome {
    /// The slot was not armed; the caller must continue normal processing
    /// of this event.
    NotArmed,
    /// The event was consumed by the resolver. If `resolved` is `Some`, the
    /// caller must cache-install and process `resolved.action` as a press
    /// for `resolved.code` at `resolved.dl`, then replay `resolved.queue`.
    Consumed { resolved: Option<Resolved> },
}

pub struct Resolved {
    pub code: KeyCode,
    pub dl: u16,
    pub action: Descriptor,
    pub queue: ArrayVec<KeyEvent, PENDING_QUEUE_CAP>,
}

#[derive(Debug, Default)]
pub struct PendingKeyResolver {
    armed: Option<Armed>,
}

impl PendingKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_code(&self) -> Option<KeyCode> {
        self.armed.as_ref().map(|a| a.code)
    }

    pub fn expire(&self) -> Option<u64> {
        self.armed.as_ref().map(|a| a.expire)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arm(
        &mut self,
        code: KeyCode,
        dl: u16,
        action1: Descriptor,
        action2: Descriptor,
        expire: u64,
        tap_expiry: Option<u64>,
        behaviour: PendingBehaviour,
    ) {
        debug_assert!(!self.is_armed(), "pending-key slot already armed");
        self.armed = Some(Armed {
            code,
            dl,
            expire,
            tap_expiry,
            behaviour,
            action1,
            action2,
            queue: ArrayVec::new(),
        });
    }

    /// Feeds one event (real or tick, `code == 0`) to the resolver.
    pub fn handle(&mut self, code: KeyCode, pressed: bool, time: u64) -> PendingOutcome {
        let Some(armed) = self.armed.as_mut() else {
            return PendingOutcome::NotArmed;
        };

        if code != 0 {
            if !pressed {
                let already_queued = armed.queue.iter().any(|e| e.code == code);
                if !already_queued && code != armed.code {
                    // Release of a key pressed before arming: pass through untouched.
                    return PendingOutcome::NotArmed;
                }
            }

            let ev = KeyEvent { code, pressed, timestamp: time };
            if armed.queue.try_push(ev).is_err() {
                debug_assert!(false, "pending-key queue overflow");
            }
        }

        let action = if time >= armed.expire {
            Some(armed.action2)
        } else if code == armed.code {
            if armed.tap_expiry.is_some_and(|t| time >= t) {
                Some(Descriptor::NULL)
            } else {
                Some(armed.action1)
            }
        } else if code != 0 && pressed && armed.behaviour == PendingBehaviour::InterruptAction1 {
            Some(armed.action1)
        } else if code != 0 && pressed && armed.behaviour == PendingBehaviour::InterruptAction2 {
            Some(armed.action2)
        } else if armed.behaviour == PendingBehaviour::UninterruptibleTapAction2 && !pressed {
            if armed.queue.iter().any(|e| e.code == code) {
                Some(armed.action2)
            } else {
                None
            }
        } else {
            None
        };

        let Some(action) = action else {
            return PendingOutcome::Consumed { resolved: None };
        };

        let Armed { code, dl, queue, .. } = self.armed.take().unwrap();
        PendingOutcome::Consumed { resolved: Some(Resolved { code, dl, action, queue }) }
    }

    pub fn clear(&mut self) {
        self.armed = None;
    }
}
