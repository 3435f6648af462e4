//! Key-name table: text config name <-> `keyrx_core::config::KeyCode`.
//!
//! Reuses the named constants `keyrx_core::config::keys` exposes and extends
//! them with the punctuation/media codes that module calls out as left to
//! this crate to define.

use keyrx_core::config::{keys, KeyCode};

pub const SEMICOLON: KeyCode = 90;
pub const APOSTROPHE: KeyCode = 91;
pub const COMMA: KeyCode = 92;
pub const PERIOD: KeyCode = 93;
pub const SLASH: KeyCode = 94;
pub const GRAVE: KeyCode = 95;
pub const MINUS: KeyCode = 96;
pub const EQUAL: KeyCode = 97;
pub const LEFTBRACE: KeyCode = 98;
pub const RIGHTBRACE: KeyCode = 99;
pub const BACKSLASH: KeyCode = 100;
pub const DELETE: KeyCode = 101;
pub const HOME: KeyCode = 102;
pub const END: KeyCode = 103;
pub const PAGEUP: KeyCode = 104;
pub const PAGEDOWN: KeyCode = 105;
pub const INSERT: KeyCode = 106;
pub const MUTE: KeyCode = 107;
pub const VOLUMEDOWN: KeyCode = 108;
pub const VOLUMEUP: KeyCode = 109;

/// Every `(text name, code)` pair the parser and `view`/`parse` output
/// recognize. Order doubles as priority for the canonical reverse-lookup
/// name (first match wins).
const KEY_TABLE: &[(&str, KeyCode)] = &[
    ("esc", keys::ESC),
    ("escape", keys::ESC),
    ("enter", keys::ENTER),
    ("return", keys::ENTER),
    ("backspace", keys::BACKSPACE),
    ("tab", keys::TAB),
    ("space", keys::SPACE),
    ("capslock", keys::CAPSLOCK),
    ("left", keys::LEFT),
    ("right", keys::RIGHT),
    ("up", keys::UP),
    ("down", keys::DOWN),
    ("leftctrl", keys::LEFTCTRL),
    ("rightctrl", keys::RIGHTCTRL),
    ("leftshift", keys::LEFTSHIFT),
    ("rightshift", keys::RIGHTSHIFT),
    ("leftalt", keys::LEFTALT),
    ("rightalt", keys::RIGHTALT),
    ("leftmeta", keys::LEFTMETA),
    ("rightmeta", keys::RIGHTMETA),
    ("f1", keys::F1),
    ("f2", keys::F2),
    ("f3", keys::F3),
    ("f4", keys::F4),
    ("f5", keys::F5),
    ("f6", keys::F6),
    ("f7", keys::F7),
    ("f8", keys::F8),
    ("f9", keys::F9),
    ("f10", keys::F10),
    ("f11", keys::F11),
    ("f12", keys::F12),
    ("a", keys::A),
    ("b", keys::B),
    ("c", keys::C),
    ("d", keys::D),
    ("e", keys::E),
    ("f", keys::F),
    ("g", keys::G),
    ("h", keys::H),
    ("i", keys::I),
    ("j", keys::J),
    ("k", keys::K),
    ("l", keys::L),
    ("m", keys::M),
    ("n", keys::N),
    ("o", keys::O),
    ("p", keys::P),
    ("q", keys::Q),
    ("r", keys::R),
    ("s", keys::S),
    ("t", keys::T),
    ("u", keys::U),
    ("v", keys::V),
    ("w", keys::W),
    ("x", keys::X),
    ("y", keys::Y),
    ("z", keys::Z),
    ("0", keys::NUM0),
    ("1", keys::NUM1),
    ("2", keys::NUM2),
    ("3", keys::NUM3),
    ("4", keys::NUM4),
    ("5", keys::NUM5),
    ("6", keys::NUM6),
    ("7", keys::NUM7),
    ("8", keys::NUM8),
    ("9", keys::NUM9),
    (";", SEMICOLON),
    ("semicolon", SEMICOLON),
    ("'", APOSTROPHE),
    ("apostrophe", APOSTROPHE),
    (",", COMMA),
    ("comma", COMMA),
    (".", PERIOD),
    ("dot", PERIOD),
    ("/", SLASH),
    ("slash", SLASH),
    ("`", GRAVE),
    ("grave", GRAVE),
    ("-", MINUS),
    ("minus", MINUS),
    ("=", EQUAL),
    ("equal", EQUAL),
    ("[", LEFTBRACE),
    ("leftbrace", LEFTBRACE),
    ("]", RIGHTBRACE),
    ("rightbrace", RIGHTBRACE),
    ("\\", BACKSLASH),
    ("backslash", BACKSLASH),
    ("delete", DELETE),
    ("del", DELETE),
    ("home", HOME),
    ("end", END),
    ("pageup", PAGEUP),
    ("pagedown", PAGEDOWN),
    ("insert", INSERT),
    ("ins", INSERT),
    ("mute", MUTE),
    ("volumedown", VOLUMEDOWN),
    ("volumeup", VOLUMEUP),
];

/// Resolves a config-text key name (case-insensitive) to a `KeyCode`.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    KEY_TABLE.iter().find(|(n, _)| *n == lower).map(|(_, c)| *c)
}

/// The canonical text name for a `KeyCode`, for `view`/`parse --json` output.
pub fn key_name(code: KeyCode) -> String {
    KEY_TABLE.iter().find(|(_, c)| *c == code).map(|(n, _)| n.to_string()).unwrap_or_else(|| format!("<{code}>"))
}
