//! Modifier engine: the output's `keystate` and modifier-guard logic.
//!
//! Every code the core ever emits flows through [`ModifierEngine::send_key`]
//! so that edge-only delivery (spec §4.2) and standalone-modifier guarding
//! (spec §4.3) are enforced in exactly one place.

use crate::config::{ModMask, GUARD_CODES, MODIFIER_TABLE, NOOP, EXTERNAL_MOUSE_BUTTON, keys, KeyCode};
use crate::output::OutputSink;
use crate::config::Layer;

/// Tracks which output codes are currently "down" and applies the
/// modifier-guard rule from spec §4.3.
#[derive(Debug)]
pub struct ModifierEngine {
    keystate: [bool; 256],
    last_pressed_output_code: KeyCode,
    pub inhibit_modifier_guard: bool,
}

impl Default for ModifierEngine {
    fn default() -> Self {
        Self { keystate: [false; 256], last_pressed_output_code: 0, inhibit_modifier_guard: false }
    }
}

impl ModifierEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self, code: KeyCode) -> bool {
        self.keystate[code as usize]
    }

    /// Every currently-down output code, for `clear()`'s full release.
    pub fn down_codes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keystate
            .iter()
            .enumerate()
            .filter(|(_, &down)| down)
            .map(|(code, _)| code as KeyCode)
    }

    /// Emits `send_key(code, pressed)` iff it is an edge. Drops `NOOP` and
    /// `EXTERNAL_MOUSE_BUTTON` silently.
    pub fn send_key(&mut self, sink: &mut impl OutputSink, code: KeyCode, pressed: bool) {
        if code == NOOP || code == EXTERNAL_MOUSE_BUTTON {
            return;
        }

        if pressed {
            self.last_pressed_output_code = code;
        }

        if self.keystate[code as usize] != pressed {
            self.keystate[code as usize] = pressed;
            sink.send_key(code, pressed);
        }
    }

    /// Releases `code`, inserting a `leftctrl` guard bracket around the
    /// release if `code` is a standalone-meaningful modifier, it was the
    /// last code pressed (nothing intervened), and guards are active.
    pub fn clear_mod(&mut self, sink: &mut impl OutputSink, code: KeyCode, disable_guard: bool) {
        let guarded = self.last_pressed_output_code == code
            && GUARD_CODES.contains(&code)
            && !self.inhibit_modifier_guard
            && !disable_guard;

        if guarded && !self.is_down(keys::LEFTCTRL) {
            self.send_key(sink, keys::LEFTCTRL, true);
            self.send_key(sink, code, false);
            self.send_key(sink, keys::LEFTCTRL, false);
        } else {
            self.send_key(sink, code, false);
        }
    }

    /// Drives the output keystate of every modifier bit towards `target`.
    pub fn set_mods(&mut self, sink: &mut impl OutputSink, target: ModMask, disable_guard: bool) {
        for entry in MODIFIER_TABLE.iter() {
            if target.contains(entry.mask) {
                if !self.is_down(entry.code) {
                    self.send_key(sink, entry.code, true);
                }
            } else if self.is_down(entry.code) {
                self.clear_mod(sink, entry.code, disable_guard);
            }
        }
    }

    /// Releases every currently-down output code (used by `clear()`).
    pub fn release_all(&mut self, sink: &mut impl OutputSink) {
        let down: alloc::vec::Vec<KeyCode> = self.down_codes().collect();
        for code in down {
            self.send_key(sink, code, false);
        }
    }

    pub fn notify_layer_change(&self, sink: &mut impl OutputSink, layer: &Layer, active: bool) {
        sink.on_layer_change(layer, active);
    }
}

extern crate alloc;
