//! Translates between evdev's `Key` codes and [`keyrx_core`]'s internal
//! [`KeyCode`] space. The core never sees a raw Linux keycode: this table is
//! the only place the two numberings meet.

use evdev::Key;
use uinput::event::keyboard::Key as UKey;

use keyrx_core::config::{keys, KeyCode};

macro_rules! bimap {
    ($($kc:expr => $evk:expr),+ $(,)?) => {
        pub fn evdev_to_keycode(key: Key) -> Option<KeyCode> {
            match key {
                $($evk => Some($kc),)+
                _ => None,
            }
        }

        pub fn keycode_to_evdev(code: KeyCode) -> Option<Key> {
            match code {
                $($kc => Some($evk),)+
                _ => None,
            }
        }
    };
}

bimap! {
    keys::ESC => Key::KEY_ESC,
    keys::ENTER => Key::KEY_ENTER,
    keys::BACKSPACE => Key::KEY_BACKSPACE,
    keys::TAB => Key::KEY_TAB,
    keys::SPACE => Key::KEY_SPACE,
    keys::CAPSLOCK => Key::KEY_CAPSLOCK,
    keys::LEFT => Key::KEY_LEFT,
    keys::RIGHT => Key::KEY_RIGHT,
    keys::UP => Key::KEY_UP,
    keys::DOWN => Key::KEY_DOWN,
    keys::LEFTCTRL => Key::KEY_LEFTCTRL,
    keys::RIGHTCTRL => Key::KEY_RIGHTCTRL,
    keys::LEFTSHIFT => Key::KEY_LEFTSHIFT,
    keys::RIGHTSHIFT => Key::KEY_RIGHTSHIFT,
    keys::LEFTALT => Key::KEY_LEFTALT,
    keys::RIGHTALT => Key::KEY_RIGHTALT,
    keys::LEFTMETA => Key::KEY_LEFTMETA,
    keys::RIGHTMETA => Key::KEY_RIGHTMETA,
    keys::F1 => Key::KEY_F1,
    keys::F2 => Key::KEY_F2,
    keys::F3 => Key::KEY_F3,
    keys::F4 => Key::KEY_F4,
    keys::F5 => Key::KEY_F5,
    keys::F6 => Key::KEY_F6,
    keys::F7 => Key::KEY_F7,
    keys::F8 => Key::KEY_F8,
    keys::F9 => Key::KEY_F9,
    keys::F10 => Key::KEY_F10,
    keys::F11 => Key::KEY_F11,
    keys::F12 => Key::KEY_F12,
    keys::A => Key::KEY_A,
    keys::B => Key::KEY_B,
    keys::C => Key::KEY_C,
    keys::D => Key::KEY_D,
    keys::E => Key::KEY_E,
    keys::F => Key::KEY_F,
    keys::G => Key::KEY_G,
    keys::H => Key::KEY_H,
    keys::I => Key::KEY_I,
    keys::J => Key::KEY_J,
    keys::K => Key::KEY_K,
    keys::L => Key::KEY_L,
    keys::M => Key::KEY_M,
    keys::N => Key::KEY_N,
    keys::O => Key::KEY_O,
    keys::P => Key::KEY_P,
    keys::Q => Key::KEY_Q,
    keys::R => Key::KEY_R,
    keys::S => Key::KEY_S,
    keys::T => Key::KEY_T,
    keys::U => Key::KEY_U,
    keys::V => Key::KEY_V,
    keys::W => Key::KEY_W,
    keys::X => Key::KEY_X,
    keys::Y => Key::KEY_Y,
    keys::Z => Key::KEY_Z,
    keys::NUM0 => Key::KEY_0,
    keys::NUM1 => Key::KEY_1,
    keys::NUM2 => Key::KEY_2,
    keys::NUM3 => Key::KEY_3,
    keys::NUM4 => Key::KEY_4,
    keys::NUM5 => Key::KEY_5,
    keys::NUM6 => Key::KEY_6,
    keys::NUM7 => Key::KEY_7,
    keys::NUM8 => Key::KEY_8,
    keys::NUM9 => Key::KEY_9,
}

/// Maps a [`KeyCode`] to the `uinput` crate's keyboard event type, used for
/// output injection (a separate enum from evdev's `Key`).
pub fn keycode_to_uinput_key(code: KeyCode) -> Option<UKey> {
    use uinput::event::keyboard::Key::*;
    Some(match code {
        keys::ESC => Escape,
        keys::ENTER => Enter,
        keys::BACKSPACE => BackSpace,
        keys::TAB => Tab,
        keys::SPACE => Space,
        keys::CAPSLOCK => CapsLock,
        keys::LEFT => Left,
        keys::RIGHT => Right,
        keys::UP => Up,
        keys::DOWN => Down,
        keys::LEFTCTRL => LeftControl,
        keys::RIGHTCTRL => RightControl,
        keys::LEFTSHIFT => LeftShift,
        keys::RIGHTSHIFT => RightShift,
        keys::LEFTALT => LeftAlt,
        keys::RIGHTALT => RightAlt,
        keys::LEFTMETA => LeftMeta,
        keys::RIGHTMETA => RightMeta,
        keys::F1 => F1,
        keys::F2 => F2,
        keys::F3 => F3,
        keys::F4 => F4,
        keys::F5 => F5,
        keys::F6 => F6,
        keys::F7 => F7,
        keys::F8 => F8,
        keys::F9 => F9,
        keys::F10 => F10,
        keys::F11 => F11,
        keys::F12 => F12,
        keys::A => A,
        keys::B => B,
        keys::C => C,
        keys::D => D,
        keys::E => E,
        keys::F => F,
        keys::G => G,
        keys::H => H,
        keys::I => I,
        keys::J => J,
        keys::K => K,
        keys::L => L,
        keys::M => M,
        keys::N => N,
        keys::O => O,
        keys::P => P,
        keys::Q => Q,
        keys::R => R,
        keys::S => S,
        keys::T => T,
        keys::U => U,
        keys::V => V,
        keys::W => W,
        keys::X => X,
        keys::Y => Y,
        keys::Z => Z,
        keys::NUM0 => _0,
        keys::NUM1 => _1,
        keys::NUM2 => _2,
        keys::NUM3 => _3,
        keys::NUM4 => _4,
        keys::NUM5 => _5,
        keys::NUM6 => _6,
        keys::NUM7 => _7,
        keys::NUM8 => _8,
        keys::NUM9 => _9,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evdev_roundtrips_through_keycode() {
        assert_eq!(evdev_to_keycode(Key::KEY_A), Some(keys::A));
        assert_eq!(keycode_to_evdev(keys::A), Some(Key::KEY_A));
    }

    #[test]
    fn unmapped_evdev_key_is_none() {
        assert_eq!(evdev_to_keycode(Key::KEY_KATAKANA), None);
    }

    #[test]
    fn uinput_mapping_covers_modifiers() {
        assert!(keycode_to_uinput_key(keys::LEFTSHIFT).is_some());
        assert!(keycode_to_uinput_key(keys::RIGHTMETA).is_some());
    }
}
