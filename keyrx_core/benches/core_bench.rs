//! Benchmarks the dispatcher hot path directly against `keyrx_core`, without
//! any platform I/O — a config with a handful of layers, chords and an
//! overload key.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use keyrx_core::config::{keys, Chord, Config, Descriptor, Layer, LayerType, ModMask, Op};
use keyrx_core::output::OutputSink;
use keyrx_core::runtime::{KeyEvent, Keyboard};

#[derive(Default)]
struct NullSink;

impl OutputSink for NullSink {
    fn send_key(&mut self, _code: keyrx_core::config::KeyCode, _pressed: bool) {}
    fn on_layer_change(&mut self, _layer: &Layer, _active: bool) {}
    fn sleep(&mut self, _millis: u64) {}
    fn run_command(&mut self, _cmd: &str) {}
}

fn chorded_config() -> Config {
    let mut config = Config::empty();
    config.layers[0].keymap[keys::A as usize] = Descriptor::keysequence(keys::A, ModMask::NONE);
    config.layers[0].keymap[keys::B as usize] = Descriptor::keysequence(keys::B, ModMask::NONE);
    config.layers[0].chords.push(Chord {
        keys: {
            let mut ks = [0u8; 8];
            ks[0] = keys::J;
            ks[1] = keys::K;
            ks
        },
        descriptor: Descriptor::keysequence(keys::ESC, ModMask::NONE),
    });
    config
}

fn overload_config() -> Config {
    let mut config = Config::empty();
    let nav = Layer {
        name: "nav".into(),
        kind: LayerType::Normal,
        mods: ModMask::NONE,
        keymap: {
            let mut km = vec![Descriptor::NULL; 256];
            km[keys::H as usize] = Descriptor::keysequence(keys::LEFT, ModMask::NONE);
            km
        },
        chords: Vec::new(),
        constituents: Vec::new(),
    };
    let nav_idx = config.layers.len() as u16;
    config.layers.push(nav);
    let esc_idx = config.descriptors.len() as u16;
    config.descriptors.push(Descriptor::keysequence(keys::ESC, ModMask::NONE));
    config.layers[0].keymap[keys::CAPSLOCK as usize] = Descriptor {
        op: Op::Overload,
        args: [
            keyrx_core::config::DescArg::from_idx(nav_idx),
            keyrx_core::config::DescArg::from_idx(esc_idx),
            keyrx_core::config::DescArg(0),
        ],
    };
    config
}

fn bench_single_tap(c: &mut Criterion) {
    let config = chorded_config();
    c.bench_function("process_events/single_tap", |b| {
        b.iter(|| {
            let mut keyboard = Keyboard::new(config.clone());
            let mut sink = NullSink::default();
            let events = [
                KeyEvent { code: keys::A, pressed: true, timestamp: 0 },
                KeyEvent { code: keys::A, pressed: false, timestamp: 5 },
            ];
            keyboard.process_events(black_box(&events), &mut sink);
        })
    });
}

fn bench_chord(c: &mut Criterion) {
    let config = chorded_config();
    c.bench_function("process_events/chord", |b| {
        b.iter(|| {
            let mut keyboard = Keyboard::new(config.clone());
            let mut sink = NullSink::default();
            let events = [
                KeyEvent { code: keys::J, pressed: true, timestamp: 0 },
                KeyEvent { code: keys::K, pressed: true, timestamp: 10 },
                KeyEvent { code: keys::K, pressed: false, timestamp: 20 },
                KeyEvent { code: keys::J, pressed: false, timestamp: 25 },
            ];
            keyboard.process_events(black_box(&events), &mut sink);
        })
    });
}

fn bench_overload_tap(c: &mut Criterion) {
    let config = overload_config();
    c.bench_function("process_events/overload_tap", |b| {
        b.iter(|| {
            let mut keyboard = Keyboard::new(config.clone());
            let mut sink = NullSink::default();
            let events = [
                KeyEvent { code: keys::CAPSLOCK, pressed: true, timestamp: 0 },
                KeyEvent { code: keys::CAPSLOCK, pressed: false, timestamp: 50 },
            ];
            keyboard.process_events(black_box(&events), &mut sink);
        })
    });
}

criterion_group!(benches, bench_single_tap, bench_chord, bench_overload_tap);
criterion_main!(benches);
