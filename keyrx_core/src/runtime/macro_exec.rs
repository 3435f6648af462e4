//! Macro executor: sequences `MacroEntry` values through the output sink
//! with timing (spec §4.9).

use crate::config::{Command, MacroEntry, MODIFIER_TABLE};
use crate::output::OutputSink;
use crate::runtime::modifier::ModifierEngine;

/// Leader chord for Unicode code-point entry: ctrl+shift+u.
const UNICODE_LEADER_MODS: [crate::config::KeyCode; 2] =
    [crate::config::keys::LEFTCTRL, crate::config::keys::LEFTSHIFT];
const UNICODE_LEADER_KEY: crate::config::KeyCode = crate::config::keys::U;

fn hex_digit_key(nibble: u8) -> crate::config::KeyCode {
    use crate::config::keys;
    match nibble {
        0 => keys::NUM0,
        1 => keys::NUM1,
        2 => keys::NUM2,
        3 => keys::NUM3,
        4 => keys::NUM4,
        5 => keys::NUM5,
        6 => keys::NUM6,
        7 => keys::NUM7,
        8 => keys::NUM8,
        9 => keys::NUM9,
        10 => keys::A,
        11 => keys::B,
        12 => keys::C,
        13 => keys::D,
        14 => keys::E,
        _ => keys::F,
    }
}

fn tap(modifier: &mut ModifierEngine, sink: &mut impl OutputSink, code: crate::config::KeyCode) {
    modifier.send_key(sink, code, true);
    modifier.send_key(sink, code, false);
}

/// Runs one macro to completion, via the tracked (keystate-aware) output
/// path so every press this executor issues still balances with a release
/// under invariant 1, even mid-stroke.
pub fn execute_macro(
    sink: &mut impl OutputSink,
    modifier: &mut ModifierEngine,
    commands: &[Command],
    entries: &[MacroEntry],
    inter_entry_timeout_ms: u64,
) {
    let mut hold_start: Option<usize> = None;

    for (i, entry) in entries.iter().enumerate() {
        match *entry {
            MacroEntry::Hold(code) => {
                if hold_start.is_none() {
                    hold_start = Some(i);
                }
                modifier.send_key(sink, code, true);
            }
            MacroEntry::Release => {
                if let Some(start) = hold_start.take() {
                    for held in &entries[start..i] {
                        if let MacroEntry::Hold(code) = held {
                            modifier.send_key(sink, *code, false);
                        }
                    }
                }
            }
            MacroEntry::Unicode(codepoint) => {
                for &m in &UNICODE_LEADER_MODS {
                    modifier.send_key(sink, m, true);
                }
                tap(modifier, sink, UNICODE_LEADER_KEY);
                for &m in &UNICODE_LEADER_MODS {
                    modifier.send_key(sink, m, false);
                }

                let mut started = false;
                for shift in (0..8).rev() {
                    let nibble = ((codepoint >> (shift * 4)) & 0xF) as u8;
                    if nibble == 0 && !started && shift != 0 {
                        continue;
                    }
                    started = true;
                    tap(modifier, sink, hex_digit_key(nibble));
                }
                tap(modifier, sink, crate::config::keys::ENTER);
                sink.sleep(10);
            }
            MacroEntry::KeySequence { code, mods } => {
                for entry in MODIFIER_TABLE.iter() {
                    if mods.contains(entry.mask) {
                        modifier.send_key(sink, entry.code, true);
                    }
                }
                if !mods.is_empty() && inter_entry_timeout_ms > 0 {
                    sink.sleep(inter_entry_timeout_ms);
                }
                tap(modifier, sink, code);
                for entry in MODIFIER_TABLE.iter() {
                    if mods.contains(entry.mask) {
                        modifier.send_key(sink, entry.code, false);
                    }
                }
            }
            MacroEntry::Timeout(ms) => sink.sleep(ms as u64),
            MacroEntry::Command(idx) => {
                if let Some(cmd) = commands.get(idx as usize) {
                    sink.run_command(cmd);
                }
            }
        }

        if inter_entry_timeout_ms > 0 {
            sink.sleep(inter_entry_timeout_ms);
        }
    }
}
