//! Chord resolver data model and pure matching logic (spec §4.7). The
//! recursive state-machine transitions (which must replay queued events
//! through the dispatcher) live on `Keyboard` in
//! [`crate::runtime::dispatcher`], since they need the whole keyboard, not
//! just this module's state.

use crate::config::{Chord, Config, KeyCode, MAX_CHORD_KEYS};
use crate::runtime::layer_state::LayerStateTable;
use crate::runtime::KeyEvent;
use arrayvec::ArrayVec;

pub const CHORD_QUEUE_CAP: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChordPhase {
    #[default]
    Inactive,
    PendingDisambiguation,
    PendingHoldTimeout,
    Resolving,
}

/// An allocated virtual-code slot bound to the chord that triggered it, so
/// per-key releases can dismantle it.
#[derive(Debug, Clone)]
pub struct ActiveChordSlot {
    pub chord: Chord,
    pub layer: u16,
    /// Copy of `chord.keys`, zeroed entry-by-entry as each key releases, so
    /// the chord definition itself never needs mutating.
    remaining: [KeyCode; MAX_CHORD_KEYS],
}

impl ActiveChordSlot {
    pub fn new(chord: Chord, layer: u16) -> Self {
        let remaining = chord.keys;
        Self { chord, layer, remaining }
    }

    /// Marks `code` released. Returns `None` if `code` isn't one of this
    /// chord's keys; otherwise `Some(true)` iff that was the last key held.
    pub fn release(&mut self, code: KeyCode) -> Option<bool> {
        let mut found = false;
        for slot in self.remaining.iter_mut() {
            if *slot == code {
                *slot = 0;
                found = true;
            }
        }
        if !found {
            return None;
        }
        Some(self.remaining.iter().all(|&k| k == 0))
    }
}

/// Reference to a chord definition by (layer index, chord index) — never a
/// pointer (spec §9 "Cycles"/"Ownership").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordRef {
    pub layer: u16,
    pub chord_idx: u16,
}

#[derive(Debug, Default)]
pub struct ChordResolverState {
    pub phase: ChordPhase,
    pub queue: ArrayVec<KeyEvent, CHORD_QUEUE_CAP>,
    pub matched: Option<ChordRef>,
    pub last_code_time: u64,
}

impl ChordResolverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, code: u8, pressed: bool, time: u64) {
        if code == 0 {
            return;
        }
        if self.queue.try_push(KeyEvent { code, pressed, timestamp: time }).is_err() {
            debug_assert!(false, "chord queue overflow");
        }
    }
}

/// Full/partial match result for one chord against the recent queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleMatch {
    None,
    Partial,
    Full,
}

/// Whether every pressed event in `queue` names a key in `chord`, and
/// whether all of the chord's (nonzero) slots are covered.
pub fn chord_event_match(chord: &Chord, queue: &[KeyEvent]) -> SingleMatch {
    if queue.is_empty() {
        return SingleMatch::None;
    }

    let mut covered = 0usize;
    let mut pressed_count = 0usize;

    for ev in queue {
        if !ev.pressed {
            continue;
        }
        pressed_count += 1;
        if !chord.contains(ev.code) {
            return SingleMatch::None;
        }
        covered += 1;
    }

    if pressed_count == 0 {
        return SingleMatch::None;
    }

    if covered == chord.len() {
        SingleMatch::Full
    } else {
        SingleMatch::Partial
    }
}

/// Outcome of scanning every active layer's chords against the queue.
pub enum ScanResult {
    NoMatch,
    Partial,
    /// Exactly one full match, no ambiguity.
    Unambiguous(ChordRef),
    /// A full match coexists with at least one partial match.
    Ambiguous(ChordRef),
}

pub fn check_chord_match(
    config: &Config,
    layer_states: &LayerStateTable,
    queue: &[KeyEvent],
) -> ScanResult {
    let mut full: Option<(ChordRef, u64)> = None;
    let mut partial = false;

    for (i, layer) in config.layers.iter().enumerate() {
        let i = i as u16;
        if !layer_states.get(i).is_active() {
            continue;
        }
        for (ci, chord) in layer.chords.iter().enumerate() {
            match chord_event_match(chord, queue) {
                SingleMatch::Full => {
                    let ts = layer_states.get(i).activation_time;
                    let replace = match &full {
                        None => true,
                        Some((_, best_ts)) => ts >= *best_ts,
                    };
                    if replace {
                        full = Some((ChordRef { layer: i, chord_idx: ci as u16 }, ts));
                    }
                }
                SingleMatch::Partial => partial = true,
                SingleMatch::None => {}
            }
        }
    }

    match (full, partial) {
        (Some((m, _)), true) => ScanResult::Ambiguous(m),
        (Some((m, _)), false) => ScanResult::Unambiguous(m),
        (None, true) => ScanResult::Partial,
        (None, false) => ScanResult::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{keys, Descriptor, MAX_CHORD_KEYS};

    fn chord(keys_in: &[u8]) -> Chord {
        let mut keys = [0u8; MAX_CHORD_KEYS];
        keys[..keys_in.len()].copy_from_slice(keys_in);
        Chord { keys, descriptor: Descriptor::keysequence(crate::config::keys::ESC, Default::default()) }
    }

    fn press(code: u8, t: u64) -> KeyEvent {
        KeyEvent { code, pressed: true, timestamp: t }
    }

    #[test]
    fn full_match_requires_all_slots_covered() {
        let c = chord(&[keys::J, keys::K]);
        let q = [press(keys::J, 0), press(keys::K, 10)];
        assert_eq!(chord_event_match(&c, &q), SingleMatch::Full);
    }

    #[test]
    fn partial_match_when_some_slots_uncovered() {
        let c = chord(&[keys::J, keys::K]);
        let q = [press(keys::J, 0)];
        assert_eq!(chord_event_match(&c, &q), SingleMatch::Partial);
    }

    #[test]
    fn no_match_when_foreign_key_pressed() {
        let c = chord(&[keys::J, keys::K]);
        let q = [press(keys::A, 0)];
        assert_eq!(chord_event_match(&c, &q), SingleMatch::None);
    }
}
