//! `Keyboard`: the event-processing core. Owns every runtime sub-state and
//! drives the per-event algorithm (spec §4.10): chord resolution, then
//! pending-key resolution, then oneshot/macro housekeeping, then descriptor
//! lookup/execution.

extern crate alloc;

use alloc::vec::Vec;
use arrayvec::ArrayVec;

use crate::config::{
    Config, Descriptor, KeyCode, LayerType, MacroEntry, ModMask, CHORD_1, CHORD_COUNT,
};
use crate::output::OutputSink;
use crate::runtime::cache::DescriptorCache;
use crate::runtime::chord::{
    check_chord_match, ActiveChordSlot, ChordPhase, ChordResolverState, ScanResult, CHORD_QUEUE_CAP,
};
use crate::runtime::layer_state::LayerStateTable;
use crate::runtime::lookup::resolve_descriptor;
use crate::runtime::macro_exec::execute_macro;
use crate::runtime::modifier::ModifierEngine;
use crate::runtime::pending::{PendingBehaviour, PendingKeyResolver, PendingOutcome};

const TIMEOUT_QUEUE_CAP: usize = 64;

/// One key event in timestamp order. `code == 0` represents a pure tick —
/// the caller invoking the core with no new physical event, purely to let a
/// scheduled timeout fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub pressed: bool,
    pub timestamp: u64,
}

/// Parses and merges one config-entry string into `config`, returning the
/// index of the added/modified layer on success. The core never parses
/// config text itself (spec §1/§6 scope this to `keyrx_compiler`); callers
/// inject their parser through this trait so `eval`'s catch-all verb still
/// works natively.
pub trait ConfigPatcher {
    fn patch(&self, config: &mut Config, entry: &str) -> Option<u16>;
}

/// A no-op patcher, for callers that never issue live config edits.
pub struct NullPatcher;

impl ConfigPatcher for NullPatcher {
    fn patch(&self, _config: &mut Config, _entry: &str) -> Option<u16> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveMacro {
    macro_idx: u16,
    layer: u16,
    repeat_interval: u64,
    next_fire: u64,
}

/// Pointer-scroll mode flag armed by `OP_SCROLL`/`OP_SCROLL_TOGGLE`. The
/// core only tracks this; consuming it against real mouse motion happens
/// outside the core (spec §4.8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub active: bool,
    pub sensitivity: i32,
}

pub struct Keyboard {
    config: Config,
    /// Backup stack for the `push`/`pop`/`pop_all`/`reset` eval verbs. Index
    /// 0 is the baseline loaded at construction and is never popped.
    config_stack: Vec<Config>,
    modifier: ModifierEngine,
    layer_states: LayerStateTable,
    cache: DescriptorCache,
    pending: PendingKeyResolver,
    chord: ChordResolverState,
    active_chords: [Option<ActiveChordSlot>; CHORD_COUNT],
    timeouts: ArrayVec<u64, TIMEOUT_QUEUE_CAP>,
    oneshot_latch: bool,
    oneshot_timeout: Option<u64>,
    active_macro: Option<ActiveMacro>,
    last_pressed_code: KeyCode,
    last_simple_key_time: u64,
    overload_start_time: u64,
    scroll: ScrollState,
}

impl Keyboard {
    pub fn new(config: Config) -> Self {
        let layer_count = config.layers.len();
        let mut layer_states = LayerStateTable::new(layer_count);

        if let Some(idx) = config.default_layout {
            let st = layer_states.get_mut(idx);
            st.active = 1;
            st.activation_time = 1;
        }

        let config_stack = alloc::vec![config.clone()];

        Self {
            config,
            config_stack,
            modifier: ModifierEngine::new(),
            layer_states,
            cache: DescriptorCache::new(),
            pending: PendingKeyResolver::new(),
            chord: ChordResolverState::new(),
            active_chords: core::array::from_fn(|_| None),
            timeouts: ArrayVec::new(),
            oneshot_latch: false,
            oneshot_timeout: None,
            active_macro: None,
            last_pressed_code: 0,
            last_simple_key_time: 0,
            overload_start_time: 0,
            scroll: ScrollState::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    /// Processes a batch of events already sorted by timestamp, firing
    /// scheduled timeouts (as synthetic `code == 0` ticks) that fall between
    /// them. Returns the delay before the next call must happen at the
    /// latest, in the caller's time units; `0` means "call at will".
    pub fn process_events(&mut self, events: &[KeyEvent], sink: &mut impl OutputSink) -> u64 {
        let mut i = 0;
        let mut timeout = 0u64;
        let mut timeout_ts = 0u64;

        while i != events.len() {
            let ev = events[i];
            if timeout > 0 && timeout_ts <= ev.timestamp {
                timeout = self.process_event(0, false, timeout_ts, sink);
                timeout_ts += timeout;
            } else {
                timeout = self.process_event(ev.code, ev.pressed, ev.timestamp, sink);
                timeout_ts = ev.timestamp + timeout;
                i += 1;
            }
        }

        timeout
    }

    /// The config-eval surface (spec §6): `reset`/`push`/`pop`/`pop_all`
    /// manage the backup stack; any other string is handed to `patcher` as a
    /// config-entry to merge live.
    pub fn eval(&mut self, expr: &str, patcher: &dyn ConfigPatcher) -> bool {
        match expr {
            "reset" => {
                if let Some(backup) = self.config_stack.last() {
                    self.config = backup.clone();
                    self.layer_states.resize(self.config.layers.len());
                    true
                } else {
                    false
                }
            }
            "push" => {
                self.config_stack.push(self.config.clone());
                true
            }
            "pop" => {
                if self.config_stack.len() <= 1 {
                    false
                } else {
                    self.config_stack.pop();
                    true
                }
            }
            "pop_all" => {
                while self.config_stack.len() > 1 {
                    self.config_stack.pop();
                }
                true
            }
            entry => {
                if let Some(idx) = patcher.patch(&mut self.config, entry) {
                    self.layer_states.resize(self.config.layers.len());
                    let _ = idx;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn schedule_timeout(&mut self, at: u64) {
        if self.timeouts.try_push(at).is_err() {
            debug_assert!(false, "timeout queue overflow");
        }
    }

    fn calculate_timeout(&mut self, time: u64) -> u64 {
        let mut next = 0u64;
        let mut kept: ArrayVec<u64, TIMEOUT_QUEUE_CAP> = ArrayVec::new();
        for &t in self.timeouts.iter() {
            if t > time {
                if next == 0 || t < next {
                    next = t;
                }
                let _ = kept.try_push(t);
            }
        }
        self.timeouts = kept;
        if next > 0 {
            next - time
        } else {
            0
        }
    }

    fn update_mods(&mut self, excluded: Option<u16>, extra: ModMask, sink: &mut impl OutputSink) {
        let active = self.layer_states.compute_active_mods(&self.config, excluded);
        let disable_guard = self.config.global.disable_modifier_guard;
        self.modifier.set_mods(sink, active.union(extra), disable_guard);
    }

    fn activate_layer(&mut self, code: KeyCode, idx: u16, _time: u64, sink: &mut impl OutputSink) {
        let activation_time = self.layer_states.next_activation_time();
        self.layer_states.increment_active(idx, activation_time);
        if let Some(entry) = self.cache.get_mut(code) {
            entry.layer = idx;
        }
        self.modifier.notify_layer_change(sink, &self.config.layers[idx as usize], true);
    }

    fn deactivate_layer(&mut self, idx: u16, sink: &mut impl OutputSink) {
        self.layer_states.decrement_active(idx);
        self.modifier.notify_layer_change(sink, &self.config.layers[idx as usize], false);
    }

    fn clear_oneshot(&mut self, sink: &mut impl OutputSink) {
        for i in 0..self.layer_states.len() as u16 {
            while self.layer_states.get(i).oneshot_depth > 0 {
                self.deactivate_layer(i, sink);
                self.layer_states.get_mut(i).oneshot_depth -= 1;
            }
        }
        self.oneshot_latch = false;
        self.oneshot_timeout = None;
    }

    fn clear(&mut self, sink: &mut impl OutputSink) {
        self.clear_oneshot(sink);
        for i in 1..self.layer_states.len() as u16 {
            if self.config.layers[i as usize].kind != LayerType::Layout
                && self.layer_states.get(i).toggled
            {
                self.layer_states.get_mut(i).toggled = false;
                self.deactivate_layer(i, sink);
            }
        }
        self.active_macro = None;
        self.modifier.release_all(sink);
    }

    fn setlayout(&mut self, idx: u16, sink: &mut impl OutputSink) {
        self.clear(sink);
        for i in 0..self.layer_states.len() as u16 {
            if self.config.layers[i as usize].kind == LayerType::Layout {
                self.layer_states.get_mut(i).active = 0;
            }
        }
        if idx != 0 {
            let st = self.layer_states.get_mut(idx);
            st.activation_time = 1;
            st.active = 1;
        }
        self.modifier.notify_layer_change(sink, &self.config.layers[idx as usize], true);
    }

    /// Runs a macro by index, collapsing the single-keysequence case to a
    /// bare tap (spec §4.9's "minimize redundant modifier strokes" note).
    fn run_macro_entries(&mut self, sink: &mut impl OutputSink, macro_idx: u16, dl: u16) {
        let single = match self.config.macros.get(macro_idx as usize) {
            Some(entries) if entries.len() == 1 => match entries[0] {
                MacroEntry::KeySequence { code, mods } => Some((code, mods)),
                _ => None,
            },
            _ => None,
        };

        if let Some((code, mods)) = single {
            self.update_mods(Some(dl), mods, sink);
            self.modifier.send_key(sink, code, true);
            self.modifier.send_key(sink, code, false);
            return;
        }

        self.update_mods(Some(dl), ModMask::NONE, sink);
        let inter = self.config.global.macro_sequence_timeout_ms;
        if let Some(entries) = self.config.macros.get(macro_idx as usize) {
            execute_macro(sink, &mut self.modifier, &self.config.commands, entries, inter);
        }
    }

    fn find_swap_source(&self, dl: u16) -> Option<KeyCode> {
        if dl == 0 || self.config.layers[dl as usize].kind != LayerType::Normal {
            return None;
        }
        self.cache.entries().find(|e| e.layer == dl).map(|e| e.code)
    }

    #[allow(clippy::too_many_lines)]
    fn process_descriptor(
        &mut self,
        code: KeyCode,
        d: &Descriptor,
        dl: u16,
        pressed: bool,
        time: u64,
        sink: &mut impl OutputSink,
    ) -> u64 {
        use crate::config::Op;

        if pressed {
            match d.op {
                Op::LayerM | Op::OneShotM | Op::ToggleM => {
                    self.run_macro_entries(sink, d.args[1].idx(), dl);
                }
                _ => {}
            }
        }

        match d.op {
            Op::Null => {}
            Op::KeySequence => {
                let new_code = d.args[0].code();
                let mods = d.args[1].mods();

                if pressed {
                    if self.modifier.is_down(new_code) {
                        self.modifier.send_key(sink, new_code, false);
                    }
                    self.update_mods(Some(dl), mods, sink);
                    self.modifier.send_key(sink, new_code, true);
                    self.clear_oneshot(sink);
                } else {
                    self.modifier.send_key(sink, new_code, false);
                    self.update_mods(None, ModMask::NONE, sink);
                }

                if mods.is_empty() || mods == ModMask::SHIFT {
                    self.last_simple_key_time = time;
                }
            }
            Op::Scroll => {
                self.scroll.sensitivity = d.args[0].sensitivity();
                self.scroll.active = pressed;
            }
            Op::ScrollToggle => {
                self.scroll.sensitivity = d.args[0].sensitivity();
                if pressed {
                    self.scroll.active = !self.scroll.active;
                }
            }
            Op::OverloadIdleTimeout => {
                if pressed {
                    let timeout_ms = d.args[2].timeout();
                    let idle = time.saturating_sub(self.last_simple_key_time);
                    let action_idx = if idle >= timeout_ms { d.args[1].idx() } else { d.args[0].idx() };
                    let action = self.config.descriptors[action_idx as usize];
                    self.process_descriptor(code, &action, dl, true, time, sink);
                    if let Some(entry) = self.cache.get_mut(code) {
                        entry.descriptor = action;
                    }
                }
            }
            Op::OverloadTimeout | Op::OverloadTimeoutTap => {
                if pressed {
                    let layer = d.args[0].idx();
                    let action = self.config.descriptors[d.args[1].idx() as usize];
                    let behaviour = if d.op == Op::OverloadTimeoutTap {
                        PendingBehaviour::UninterruptibleTapAction2
                    } else {
                        PendingBehaviour::Uninterruptible
                    };
                    let expire = time + d.args[2].timeout();
                    self.pending.arm(code, dl, action, Descriptor::layer(layer), expire, None, behaviour);
                    self.schedule_timeout(expire);
                }
            }
            Op::Layout => {
                if pressed {
                    self.setlayout(d.args[0].idx(), sink);
                }
            }
            Op::LayerM | Op::Layer => {
                let idx = d.args[0].idx();
                if pressed {
                    self.activate_layer(code, idx, time, sink);
                } else {
                    self.deactivate_layer(idx, sink);
                }

                if self.last_pressed_code == code {
                    self.modifier.inhibit_modifier_guard = true;
                    self.update_mods(None, ModMask::NONE, sink);
                    self.modifier.inhibit_modifier_guard = false;
                } else {
                    self.update_mods(None, ModMask::NONE, sink);
                }
            }
            Op::ClearM => {
                if pressed {
                    self.clear(sink);
                    self.run_macro_entries(sink, d.args[0].idx(), dl);
                }
            }
            Op::Clear => {
                if pressed {
                    self.clear(sink);
                }
            }
            Op::Overload => {
                let idx = d.args[0].idx();
                let action = self.config.descriptors[d.args[1].idx() as usize];

                if pressed {
                    self.overload_start_time = time;
                    self.activate_layer(code, idx, time, sink);
                    self.update_mods(None, ModMask::NONE, sink);
                } else {
                    self.deactivate_layer(idx, sink);
                    self.update_mods(None, ModMask::NONE, sink);

                    let tap_timeout = self.config.global.overload_tap_timeout_ms;
                    let within_tap = tap_timeout == 0
                        || time.saturating_sub(self.overload_start_time) < tap_timeout;

                    if self.last_pressed_code == code && within_tap {
                        if action.op == Op::Macro {
                            self.run_macro_entries(sink, action.args[0].idx(), dl);
                        } else {
                            self.process_descriptor(code, &action, dl, true, time, sink);
                            self.process_descriptor(code, &action, dl, false, time, sink);
                        }
                    }
                }
            }
            Op::OneShotM | Op::OneShot => {
                let idx = d.args[0].idx();
                if pressed {
                    self.activate_layer(code, idx, time, sink);
                    self.update_mods(Some(dl), ModMask::NONE, sink);
                    self.oneshot_latch = true;
                } else if self.oneshot_latch {
                    self.layer_states.get_mut(idx).oneshot_depth += 1;
                    let timeout_ms = self.config.global.oneshot_timeout_ms;
                    if timeout_ms > 0 {
                        let expire = time + timeout_ms;
                        self.oneshot_timeout = Some(expire);
                        self.schedule_timeout(expire);
                    }
                } else {
                    self.deactivate_layer(idx, sink);
                    self.update_mods(None, ModMask::NONE, sink);
                }
            }
            Op::Macro | Op::Macro2 => {
                if pressed {
                    let (macro_idx, entry_timeout, repeat_interval) = if d.op == Op::Macro2 {
                        (d.args[2].idx(), d.args[0].timeout(), d.args[1].timeout())
                    } else {
                        (
                            d.args[0].idx(),
                            self.config.global.macro_timeout_ms,
                            self.config.global.macro_repeat_timeout_ms,
                        )
                    };

                    self.clear_oneshot(sink);
                    self.run_macro_entries(sink, macro_idx, dl);

                    let next_fire = time + entry_timeout;
                    self.active_macro = Some(ActiveMacro { macro_idx, layer: dl, repeat_interval, next_fire });
                    self.schedule_timeout(next_fire);
                }
            }
            Op::ToggleM | Op::Toggle => {
                let idx = d.args[0].idx();
                if pressed {
                    let st = self.layer_states.get_mut(idx);
                    st.toggled = !st.toggled;
                    let now_toggled = st.toggled;

                    if now_toggled {
                        self.activate_layer(code, idx, time, sink);
                    } else {
                        self.deactivate_layer(idx, sink);
                    }

                    self.update_mods(None, ModMask::NONE, sink);
                    self.clear_oneshot(sink);
                }
            }
            Op::Timeout => {
                if pressed {
                    let action1 = self.config.descriptors[d.args[0].idx() as usize];
                    let action2 = self.config.descriptors[d.args[2].idx() as usize];
                    let expire = time + d.args[1].timeout();
                    self.pending.arm(code, dl, action1, action2, expire, None, PendingBehaviour::InterruptAction1);
                    self.schedule_timeout(expire);
                }
            }
            Op::Command => {
                if pressed {
                    if let Some(cmd) = self.config.commands.get(d.args[0].idx() as usize) {
                        sink.run_command(cmd);
                    }
                    self.clear_oneshot(sink);
                    self.update_mods(None, ModMask::NONE, sink);
                }
            }
            Op::Swap | Op::SwapM => {
                let idx = d.args[0].idx();

                if pressed {
                    if self.layer_states.get(dl).toggled {
                        self.layer_states.get_mut(dl).toggled = false;
                        self.deactivate_layer(dl, sink);
                        self.activate_layer(0, idx, time, sink);
                        self.layer_states.get_mut(idx).toggled = true;
                        self.update_mods(None, ModMask::NONE, sink);
                    } else if self.layer_states.get(dl).oneshot_depth > 0 {
                        self.deactivate_layer(dl, sink);
                        self.layer_states.get_mut(dl).oneshot_depth -= 1;
                        self.activate_layer(0, idx, time, sink);
                        self.layer_states.get_mut(idx).oneshot_depth += 1;
                        self.update_mods(None, ModMask::NONE, sink);
                    } else if let Some(source_code) = self.find_swap_source(dl) {
                        if let Some(entry) = self.cache.get_mut(source_code) {
                            entry.descriptor = Descriptor::layer(idx);
                        }
                        self.deactivate_layer(dl, sink);
                        self.activate_layer(source_code, idx, time, sink);
                        self.update_mods(None, ModMask::NONE, sink);
                    }

                    if d.op == Op::SwapM {
                        self.run_macro_entries(sink, d.args[1].idx(), dl);
                    }
                } else if d.op == Op::SwapM {
                    let single = match self.config.macros.get(d.args[1].idx() as usize) {
                        Some(entries) if entries.len() == 1 => match entries[0] {
                            MacroEntry::KeySequence { code, .. } => Some(code),
                            _ => None,
                        },
                        _ => None,
                    };
                    if let Some(mcode) = single {
                        self.modifier.send_key(sink, mcode, false);
                        self.update_mods(None, ModMask::NONE, sink);
                    }
                }
            }
        }

        if pressed {
            self.last_pressed_code = code;
        }

        0
    }

    fn handle_pending_key(
        &mut self,
        code: KeyCode,
        pressed: bool,
        time: u64,
        sink: &mut impl OutputSink,
    ) -> bool {
        match self.pending.handle(code, pressed, time) {
            PendingOutcome::NotArmed => false,
            PendingOutcome::Consumed { resolved: None } => true,
            PendingOutcome::Consumed { resolved: Some(r) } => {
                self.cache.set(r.code, r.action, r.dl);
                self.process_descriptor(r.code, &r.action, r.dl, true, time, sink);
                for ev in r.queue {
                    self.process_event(ev.code, ev.pressed, ev.timestamp, sink);
                }
                true
            }
        }
    }

    fn resolve_chord(&mut self, sink: &mut impl OutputSink) {
        self.chord.phase = ChordPhase::Resolving;
        let matched = self.chord.matched.take();
        let mut queue_offset = 0usize;

        if let Some(m) = matched {
            let chord_def = self.config.layers[m.layer as usize].chords[m.chord_idx as usize];
            if let Some(slot) = (0..CHORD_COUNT).find(|&i| self.active_chords[i].is_none()) {
                queue_offset = chord_def.len();
                self.active_chords[slot] = Some(ActiveChordSlot::new(chord_def, m.layer));
                let chord_code = CHORD_1 + slot as KeyCode;
                let last_code_time = self.chord.last_code_time;
                self.process_event(chord_code, true, last_code_time, sink);
            }
        }

        let replay: ArrayVec<KeyEvent, CHORD_QUEUE_CAP> = self.chord.queue.drain(queue_offset..).collect();
        self.chord.queue.clear();
        self.chord.phase = ChordPhase::Inactive;

        for ev in replay {
            self.process_event(ev.code, ev.pressed, ev.timestamp, sink);
        }
    }

    fn abort_chord(&mut self, sink: &mut impl OutputSink) {
        self.chord.matched = None;
        self.resolve_chord(sink);
    }

    fn handle_chord(
        &mut self,
        code: KeyCode,
        pressed: bool,
        time: u64,
        sink: &mut impl OutputSink,
    ) -> bool {
        let interkey_timeout = self.config.global.chord_interkey_timeout_ms;
        let hold_timeout = self.config.global.chord_hold_timeout_ms;

        if code != 0 && !pressed {
            for slot in 0..CHORD_COUNT {
                if let Some(active) = self.active_chords[slot].as_mut() {
                    if let Some(last) = active.release(code) {
                        if last {
                            self.active_chords[slot] = None;
                            let chord_code = CHORD_1 + slot as KeyCode;
                            self.process_event(chord_code, false, time, sink);
                        }
                        return true;
                    }
                }
            }
        }

        match self.chord.phase {
            ChordPhase::Resolving => false,
            ChordPhase::Inactive => {
                self.chord.queue.clear();
                self.chord.matched = None;
                self.chord.enqueue(code, pressed, time);

                match check_chord_match(&self.config, &self.layer_states, self.chord.queue.as_slice()) {
                    ScanResult::NoMatch => false,
                    ScanResult::Partial => {
                        self.chord.phase = ChordPhase::PendingDisambiguation;
                        self.chord.last_code_time = time;
                        self.schedule_timeout(time + interkey_timeout);
                        true
                    }
                    ScanResult::Ambiguous(m) => {
                        self.chord.matched = Some(m);
                        self.chord.phase = ChordPhase::PendingDisambiguation;
                        self.chord.last_code_time = time;
                        self.schedule_timeout(time + interkey_timeout);
                        true
                    }
                    ScanResult::Unambiguous(m) => {
                        self.chord.matched = Some(m);
                        self.chord.last_code_time = time;
                        if hold_timeout > 0 {
                            self.chord.phase = ChordPhase::PendingHoldTimeout;
                            self.schedule_timeout(time + hold_timeout);
                        } else {
                            self.resolve_chord(sink);
                        }
                        true
                    }
                }
            }
            ChordPhase::PendingDisambiguation => {
                if code == 0 {
                    if time.saturating_sub(self.chord.last_code_time) >= interkey_timeout {
                        if self.chord.matched.is_some() {
                            let timeleft = hold_timeout.saturating_sub(interkey_timeout);
                            if timeleft > 0 {
                                self.schedule_timeout(time + timeleft);
                                self.chord.phase = ChordPhase::PendingHoldTimeout;
                            } else {
                                self.resolve_chord(sink);
                            }
                        } else {
                            self.abort_chord(sink);
                        }
                        return true;
                    }
                    return false;
                }

                self.chord.enqueue(code, pressed, time);

                if !pressed {
                    self.abort_chord(sink);
                    return true;
                }

                match check_chord_match(&self.config, &self.layer_states, self.chord.queue.as_slice()) {
                    ScanResult::NoMatch => self.abort_chord(sink),
                    ScanResult::Partial => {
                        self.chord.last_code_time = time;
                        self.chord.phase = ChordPhase::PendingDisambiguation;
                        self.schedule_timeout(time + interkey_timeout);
                    }
                    ScanResult::Ambiguous(m) => {
                        self.chord.matched = Some(m);
                        self.chord.last_code_time = time;
                        self.chord.phase = ChordPhase::PendingDisambiguation;
                        self.schedule_timeout(time + interkey_timeout);
                    }
                    ScanResult::Unambiguous(m) => {
                        self.chord.matched = Some(m);
                        self.chord.last_code_time = time;
                        if hold_timeout > 0 {
                            self.chord.phase = ChordPhase::PendingHoldTimeout;
                            self.schedule_timeout(time + hold_timeout);
                        } else {
                            self.resolve_chord(sink);
                        }
                    }
                }
                true
            }
            ChordPhase::PendingHoldTimeout => {
                if code == 0 {
                    if time.saturating_sub(self.chord.last_code_time) >= hold_timeout {
                        self.resolve_chord(sink);
                        return true;
                    }
                    return false;
                }

                self.chord.enqueue(code, pressed, time);

                if !pressed {
                    if let Some(m) = self.chord.matched {
                        if self.config.layers[m.layer as usize].chords[m.chord_idx as usize].contains(code) {
                            self.abort_chord(sink);
                        }
                    }
                }
                true
            }
        }
    }

    fn process_event(&mut self, code: KeyCode, pressed: bool, time: u64, sink: &mut impl OutputSink) -> u64 {
        if self.handle_chord(code, pressed, time, sink) {
            return self.calculate_timeout(time);
        }
        if self.handle_pending_key(code, pressed, time, sink) {
            return self.calculate_timeout(time);
        }

        if let Some(ot) = self.oneshot_timeout {
            if time >= ot {
                self.clear_oneshot(sink);
                self.update_mods(None, ModMask::NONE, sink);
            }
        }

        if let Some(active) = self.active_macro {
            if code != 0 {
                self.active_macro = None;
                self.update_mods(None, ModMask::NONE, sink);
            } else if time >= active.next_fire {
                self.run_macro_entries(sink, active.macro_idx, active.layer);
                let next_fire = time + active.repeat_interval;
                self.active_macro = Some(ActiveMacro { next_fire, ..active });
                self.schedule_timeout(next_fire);
            }
        }

        if code != 0 {
            let (d, dl);
            if pressed {
                if self.cache.get(code).is_some() {
                    return self.calculate_timeout(time);
                }
                let (desc, layer) = resolve_descriptor(code, &self.config, &self.layer_states, &self.active_chords);
                if !self.cache.set(code, desc, layer) {
                    return self.calculate_timeout(time);
                }
                d = desc;
                dl = layer;
            } else {
                let Some(entry) = self.cache.get(code).copied() else {
                    return self.calculate_timeout(time);
                };
                self.cache.clear(code);
                d = entry.descriptor;
                dl = entry.dl;
            }

            self.process_descriptor(code, &d, dl, pressed, time, sink);
        }

        self.calculate_timeout(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{keys, Chord, Config, Layer, MAX_CHORD_KEYS};
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<(KeyCode, bool)>,
    }

    impl OutputSink for Recorder {
        fn send_key(&mut self, code: KeyCode, pressed: bool) {
            self.keys.push((code, pressed));
        }
        fn on_layer_change(&mut self, _layer: &crate::config::Layer, _active: bool) {}
        fn sleep(&mut self, _millis: u64) {}
        fn run_command(&mut self, _cmd: &str) {}
    }

    fn bound_layer(binding: &[(KeyCode, Descriptor)]) -> Layer {
        let mut keymap = alloc::vec![Descriptor::NULL; 256];
        for &(code, d) in binding {
            keymap[code as usize] = d;
        }
        Layer {
            name: "l".into(),
            kind: LayerType::Normal,
            mods: ModMask::NONE,
            keymap,
            chords: Vec::new(),
            constituents: Vec::new(),
        }
    }

    #[test]
    fn plain_keysequence_roundtrips() {
        let mut config = Config::empty();
        config.layers[0].keymap[keys::A as usize] = Descriptor::keysequence(keys::B, ModMask::NONE);
        let mut kbd = Keyboard::new(config);
        let mut sink = Recorder::default();

        kbd.process_events(&[KeyEvent { code: keys::A, pressed: true, timestamp: 0 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::A, pressed: false, timestamp: 10 }], &mut sink);

        assert_eq!(sink.keys, alloc::vec![(keys::B, true), (keys::B, false)]);
    }

    #[test]
    fn layer_activates_then_remaps_key() {
        let mut config = Config::empty();
        config.layers[0].keymap[keys::CAPSLOCK as usize] = Descriptor::layer(1);
        config.layers.push(bound_layer(&[(keys::H, Descriptor::keysequence(keys::LEFT, ModMask::NONE))]));
        let mut kbd = Keyboard::new(config);
        let mut sink = Recorder::default();

        kbd.process_events(&[KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::H, pressed: true, timestamp: 1 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::H, pressed: false, timestamp: 2 }], &mut sink);

        assert_eq!(sink.keys, alloc::vec![(keys::LEFT, true), (keys::LEFT, false)]);
    }

    #[test]
    fn overload_timeout_taps_action1_before_expiry() {
        let mut config = Config::empty();
        config.descriptors.push(Descriptor::keysequence(keys::ESC, ModMask::NONE));
        config.layers[0].keymap[keys::CAPSLOCK as usize] = Descriptor {
            op: crate::config::Op::OverloadTimeout,
            args: [
                crate::config::DescArg::from_idx(1),
                crate::config::DescArg::from_idx(0),
                crate::config::DescArg::from_timeout(200),
            ],
        };
        let mut kbd = Keyboard::new(config);
        let mut sink = Recorder::default();

        kbd.process_events(&[KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::CAPSLOCK, pressed: false, timestamp: 50 }], &mut sink);

        assert_eq!(sink.keys, alloc::vec![(keys::ESC, true), (keys::ESC, false)]);
    }

    #[test]
    fn chord_fires_on_full_match_release() {
        let mut config = Config::empty();
        let mut keys_arr = [0u8; MAX_CHORD_KEYS];
        keys_arr[0] = keys::J;
        keys_arr[1] = keys::K;
        config.layers[0].chords.push(Chord {
            keys: keys_arr,
            descriptor: Descriptor::keysequence(keys::ESC, ModMask::NONE),
        });
        let mut kbd = Keyboard::new(config);
        let mut sink = Recorder::default();

        kbd.process_events(&[KeyEvent { code: keys::J, pressed: true, timestamp: 0 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::K, pressed: true, timestamp: 5 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::J, pressed: false, timestamp: 10 }], &mut sink);
        kbd.process_events(&[KeyEvent { code: keys::K, pressed: false, timestamp: 11 }], &mut sink);

        assert_eq!(sink.keys, alloc::vec![(keys::ESC, true), (keys::ESC, false)]);
    }

    #[test]
    fn eval_push_then_reset_restores_checkpoint() {
        let config = Config::empty();
        let mut kbd = Keyboard::new(config);
        kbd.eval("push", &NullPatcher);
        kbd.config.global.oneshot_timeout_ms = 999;
        assert!(kbd.eval("reset", &NullPatcher));
        assert_eq!(kbd.config.global.oneshot_timeout_ms, 0);
    }

    #[test]
    fn eval_pop_refuses_to_drop_baseline() {
        let mut kbd = Keyboard::new(Config::empty());
        assert!(!kbd.eval("pop", &NullPatcher));
    }
}
