//! End-to-end (minus real hardware): build a small config, run raw key
//! events through `Keyboard`, and check what reaches the `OutputSink`.

use keyrx_core::config::{keys, Config, Descriptor, ModMask};
use keyrx_core::runtime::{KeyEvent, Keyboard};
use keyrx_daemon::test_utils::RecordingSink;

fn config_with(bindings: &[(u8, Descriptor)]) -> Config {
    let mut config = Config::empty();
    for &(code, descriptor) in bindings {
        config.layers[0].keymap[code as usize] = descriptor;
    }
    config
}

#[test]
fn a_tap_reaches_the_sink_as_a_balanced_press_and_release() {
    let config = config_with(&[(keys::A, Descriptor::keysequence(keys::B, ModMask::NONE))]);
    let mut keyboard = Keyboard::new(config);
    let mut sink = RecordingSink::default();

    keyboard.process_events(
        &[
            KeyEvent { code: keys::A, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::A, pressed: false, timestamp: 10 },
        ],
        &mut sink,
    );

    assert!(sink.pressed_then_released(keys::B));
    assert!(!sink.keys.iter().any(|&(c, _)| c == keys::A));
}

#[test]
fn unbound_keys_produce_no_output() {
    let config = Config::empty();
    let mut keyboard = Keyboard::new(config);
    let mut sink = RecordingSink::default();

    keyboard.process_events(
        &[
            KeyEvent { code: keys::SPACE, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::SPACE, pressed: false, timestamp: 5 },
        ],
        &mut sink,
    );

    assert!(sink.keys.is_empty());
}

#[test]
fn a_key_bound_to_itself_passes_through() {
    let config = config_with(&[(keys::SPACE, Descriptor::keysequence(keys::SPACE, ModMask::NONE))]);
    let mut keyboard = Keyboard::new(config);
    let mut sink = RecordingSink::default();

    keyboard.process_events(
        &[
            KeyEvent { code: keys::SPACE, pressed: true, timestamp: 0 },
            KeyEvent { code: keys::SPACE, pressed: false, timestamp: 5 },
        ],
        &mut sink,
    );

    assert!(sink.pressed_then_released(keys::SPACE));
}
