//! Literal input-trace-to-output-trace scenarios, grounded in the kind of
//! config a `keyrx_compiler`-produced `.krx` actually carries.

use keyrx_core::config::{keys, Chord, Config, DescArg, Descriptor, Layer, LayerType, ModMask, Op};
use keyrx_core::output::OutputSink;
use keyrx_core::runtime::{KeyEvent, Keyboard};

#[derive(Debug, Default)]
struct RecordingSink {
    keys: Vec<(u8, bool)>,
}

impl OutputSink for RecordingSink {
    fn send_key(&mut self, code: u8, pressed: bool) {
        self.keys.push((code, pressed));
    }
    fn on_layer_change(&mut self, _layer: &Layer, _active: bool) {}
    fn sleep(&mut self, _millis: u64) {}
    fn run_command(&mut self, _cmd: &str) {}
}

fn blank_layer(name: &str, kind: LayerType) -> Layer {
    Layer {
        name: name.into(),
        kind,
        mods: ModMask::NONE,
        keymap: vec![Descriptor::NULL; 256],
        chords: Vec::new(),
        constituents: Vec::new(),
    }
}

fn run(config: Config, events: &[KeyEvent]) -> Vec<(u8, bool)> {
    let mut keyboard = Keyboard::new(config);
    let mut sink = RecordingSink::default();
    keyboard.process_events(events, &mut sink);
    sink.keys
}

#[test]
fn s1_simple_remap() {
    let mut config = Config::empty();
    config.layers[0].keymap[keys::A as usize] = Descriptor::keysequence(keys::B, ModMask::NONE);

    let out = run(
        config,
        &[
            KeyEvent { code: keys::A, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::A, pressed: false, timestamp: 10 },
        ],
    );
    assert_eq!(out, vec![(keys::B, true), (keys::B, false)]);
}

#[test]
fn s2_layer_hold() {
    let mut config = Config::empty();
    let mut nav = blank_layer("nav", LayerType::Normal);
    nav.keymap[keys::H as usize] = Descriptor::keysequence(keys::LEFT, ModMask::NONE);
    let nav_idx = config.layers.len() as u16;
    config.layers.push(nav);
    config.layers[0].keymap[keys::CAPSLOCK as usize] = Descriptor::layer(nav_idx);

    let out = run(
        config,
        &[
            KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::H, pressed: true, timestamp: 5 },
            KeyEvent { code: keys::H, pressed: false, timestamp: 10 },
            KeyEvent { code: keys::CAPSLOCK, pressed: false, timestamp: 15 },
        ],
    );
    assert_eq!(out, vec![(keys::LEFT, true), (keys::LEFT, false)]);
}

fn overload_config() -> (Config, u16) {
    let mut config = Config::empty();
    let mut nav = blank_layer("nav", LayerType::Normal);
    nav.keymap[keys::H as usize] = Descriptor::keysequence(keys::LEFT, ModMask::NONE);
    let nav_idx = config.layers.len() as u16;
    config.layers.push(nav);

    let esc_idx = config.descriptors.len() as u16;
    config.descriptors.push(Descriptor::keysequence(keys::ESC, ModMask::NONE));

    config.layers[0].keymap[keys::CAPSLOCK as usize] = Descriptor {
        op: Op::Overload,
        args: [DescArg::from_idx(nav_idx), DescArg::from_idx(esc_idx), DescArg(0)],
    };
    config.global.overload_tap_timeout_ms = 200;
    (config, nav_idx)
}

#[test]
fn s3_overload_tap() {
    let (config, _) = overload_config();

    let out = run(
        config,
        &[
            KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::CAPSLOCK, pressed: false, timestamp: 50 },
        ],
    );
    assert_eq!(out, vec![(keys::ESC, true), (keys::ESC, false)]);
}

#[test]
fn s4_overload_hold() {
    let (config, _) = overload_config();

    let out = run(
        config,
        &[
            KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::H, pressed: true, timestamp: 20 },
            KeyEvent { code: keys::H, pressed: false, timestamp: 30 },
            KeyEvent { code: keys::CAPSLOCK, pressed: false, timestamp: 40 },
        ],
    );
    assert_eq!(out, vec![(keys::LEFT, true), (keys::LEFT, false)]);
    assert!(!out.iter().any(|&(c, _)| c == keys::ESC), "overload hold must not also tap esc");
}

#[test]
fn s5_oneshot() {
    let mut config = Config::empty();
    let mut shift = blank_layer("shift", LayerType::Normal);
    shift.mods = ModMask::SHIFT;
    let shift_idx = config.layers.len() as u16;
    config.layers.push(shift);

    config.layers[0].keymap[keys::LEFTSHIFT as usize] = Descriptor {
        op: Op::OneShot,
        args: [DescArg::from_idx(shift_idx), DescArg(0), DescArg(0)],
    };
    config.layers[0].keymap[keys::A as usize] = Descriptor::keysequence(keys::A, ModMask::NONE);

    let out = run(
        config,
        &[
            KeyEvent { code: keys::LEFTSHIFT, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::LEFTSHIFT, pressed: false, timestamp: 5 },
            KeyEvent { code: keys::A, pressed: true, timestamp: 10 },
            KeyEvent { code: keys::A, pressed: false, timestamp: 15 },
        ],
    );
    assert_eq!(
        out,
        vec![
            (keys::LEFTSHIFT, true),
            (keys::A, true),
            (keys::A, false),
            (keys::LEFTSHIFT, false),
        ]
    );
}

#[test]
fn s6_chord() {
    let mut config = Config::empty();
    let mut keys_arr = [0u8; 8];
    keys_arr[0] = keys::J;
    keys_arr[1] = keys::K;
    config.layers[0].chords.push(Chord {
        keys: keys_arr,
        descriptor: Descriptor::keysequence(keys::ESC, ModMask::NONE),
    });
    config.global.chord_interkey_timeout_ms = 50;

    let out = run(
        config,
        &[
            KeyEvent { code: keys::J, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::K, pressed: true, timestamp: 10 },
            KeyEvent { code: keys::K, pressed: false, timestamp: 20 },
            KeyEvent { code: keys::J, pressed: false, timestamp: 25 },
        ],
    );
    assert_eq!(out, vec![(keys::ESC, true), (keys::ESC, false)]);
}

#[test]
fn s7_macro_timing() {
    use keyrx_core::config::MacroEntry;

    let mut config = Config::empty();
    let macro_idx = config.macros.len() as u16;
    config.macros.push(vec![
        MacroEntry::KeySequence { code: keys::A, mods: ModMask::CTRL },
        MacroEntry::Timeout(100),
        MacroEntry::KeySequence { code: keys::B, mods: ModMask::NONE },
    ]);
    config.layers[0].keymap[keys::F1 as usize] = Descriptor {
        op: Op::Macro,
        args: [DescArg::from_idx(macro_idx), DescArg(0), DescArg(0)],
    };
    config.global.macro_sequence_timeout_ms = 0;

    let out = run(
        config,
        &[
            KeyEvent { code: keys::F1, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::F1, pressed: false, timestamp: 5 },
        ],
    );
    assert_eq!(
        out,
        vec![
            (keys::LEFTCTRL, true),
            (keys::A, true),
            (keys::A, false),
            (keys::LEFTCTRL, false),
            (keys::B, true),
            (keys::B, false),
        ]
    );
}

/// S8 — Modifier guard. Config: `leftmeta = layer(meta)`, `meta.mods = META`,
/// default guards on. A bare tap of `leftmeta` (nothing intervening) hits
/// the dispatcher's own tap-inhibit branch (`Op::Layer`'s release arm,
/// `last_pressed_code == code`) and suppresses the guard, so a real guard
/// bracket needs some other key pressed and released while `leftmeta` is
/// held. That other key is bound to a second, mod-less `layer()` so it
/// moves `last_pressed_code` away from `leftmeta` without itself emitting
/// any output (spec §4.3's guard additionally requires the output's own
/// `last_pressed_output_code` to still be the modifier being released).
#[test]
fn s8_modifier_guard() {
    let mut config = Config::empty();
    let mut meta = blank_layer("meta", LayerType::Normal);
    meta.mods = ModMask::META;
    let meta_idx = config.layers.len() as u16;
    config.layers.push(meta);

    let dummy_idx = config.layers.len() as u16;
    config.layers.push(blank_layer("dummy", LayerType::Normal));

    config.layers[0].keymap[keys::LEFTMETA as usize] = Descriptor::layer(meta_idx);
    config.layers[0].keymap[keys::B as usize] = Descriptor::layer(dummy_idx);

    let out = run(
        config,
        &[
            KeyEvent { code: keys::LEFTMETA, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::B, pressed: true, timestamp: 5 },
            KeyEvent { code: keys::B, pressed: false, timestamp: 10 },
            KeyEvent { code: keys::LEFTMETA, pressed: false, timestamp: 15 },
        ],
    );
    assert_eq!(
        out,
        vec![
            (keys::LEFTMETA, true),
            (keys::LEFTCTRL, true),
            (keys::LEFTMETA, false),
            (keys::LEFTCTRL, false),
        ]
    );
}
