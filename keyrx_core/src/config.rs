//! Static configuration data: layers, descriptors, macros, chords, commands.
//!
//! Everything here is `#[repr(C)]` and `rkyv`-archivable so a compiled
//! configuration can be loaded zero-copy from a memory-mapped blob produced
//! by `keyrx_compiler`. Nothing in this module owns runtime (mutable) state;
//! see [`crate::runtime`] for that.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use rkyv::{Archive, Deserialize, Serialize};

/// A physical or synthetic key code. `0` is reserved ("tick only" / no-op).
pub type KeyCode = u8;

/// Key codes dropped silently by the output sink (never forwarded).
pub const NOOP: KeyCode = 0;
pub const EXTERNAL_MOUSE_BUTTON: KeyCode = 247;

/// Number of virtual codes reserved for active chords.
pub const CHORD_COUNT: usize = 8;
pub const CHORD_1: KeyCode = 248;
pub const CHORD_MAX: KeyCode = CHORD_1 + CHORD_COUNT as KeyCode - 1;

/// Maximum physical keys a single chord definition may name.
pub const MAX_CHORD_KEYS: usize = 8;

/// A small, non-exhaustive set of named key codes, for config parsing and
/// tests. Mirrors the subset of `keyd`'s `keys.h` table this core's
/// scenarios exercise; the full table is extended by `keyrx_compiler`.
pub mod keys {
    use super::KeyCode;

    pub const ESC: KeyCode = 1;
    pub const ENTER: KeyCode = 2;
    pub const BACKSPACE: KeyCode = 3;
    pub const TAB: KeyCode = 4;
    pub const SPACE: KeyCode = 5;
    pub const CAPSLOCK: KeyCode = 6;

    pub const LEFT: KeyCode = 10;
    pub const RIGHT: KeyCode = 11;
    pub const UP: KeyCode = 12;
    pub const DOWN: KeyCode = 13;

    pub const LEFTCTRL: KeyCode = 20;
    pub const RIGHTCTRL: KeyCode = 21;
    pub const LEFTSHIFT: KeyCode = 22;
    pub const RIGHTSHIFT: KeyCode = 23;
    pub const LEFTALT: KeyCode = 24;
    pub const RIGHTALT: KeyCode = 25;
    pub const LEFTMETA: KeyCode = 26;
    pub const RIGHTMETA: KeyCode = 27;

    pub const F1: KeyCode = 30;
    pub const F2: KeyCode = 31;
    pub const F3: KeyCode = 32;
    pub const F4: KeyCode = 33;
    pub const F5: KeyCode = 34;
    pub const F6: KeyCode = 35;
    pub const F7: KeyCode = 36;
    pub const F8: KeyCode = 37;
    pub const F9: KeyCode = 38;
    pub const F10: KeyCode = 39;
    pub const F11: KeyCode = 40;
    pub const F12: KeyCode = 41;

    pub const A: KeyCode = 50;
    pub const B: KeyCode = 51;
    pub const C: KeyCode = 52;
    pub const D: KeyCode = 53;
    pub const E: KeyCode = 54;
    pub const F: KeyCode = 55;
    pub const G: KeyCode = 56;
    pub const H: KeyCode = 57;
    pub const I: KeyCode = 58;
    pub const J: KeyCode = 59;
    pub const K: KeyCode = 60;
    pub const L: KeyCode = 61;
    pub const M: KeyCode = 62;
    pub const N: KeyCode = 63;
    pub const O: KeyCode = 64;
    pub const P: KeyCode = 65;
    pub const Q: KeyCode = 66;
    pub const R: KeyCode = 67;
    pub const S: KeyCode = 68;
    pub const T: KeyCode = 69;
    pub const U: KeyCode = 70;
    pub const V: KeyCode = 71;
    pub const W: KeyCode = 72;
    pub const X: KeyCode = 73;
    pub const Y: KeyCode = 74;
    pub const Z: KeyCode = 75;

    pub const NUM0: KeyCode = 80;
    pub const NUM1: KeyCode = 81;
    pub const NUM2: KeyCode = 82;
    pub const NUM3: KeyCode = 83;
    pub const NUM4: KeyCode = 84;
    pub const NUM5: KeyCode = 85;
    pub const NUM6: KeyCode = 86;
    pub const NUM7: KeyCode = 87;
    pub const NUM8: KeyCode = 88;
    pub const NUM9: KeyCode = 89;
}

/// Modifier bitmask. Bit layout adopted from the original `modifiers[]`
/// table: ctrl, shift, alt, altgr, meta.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug, Hash)]
#[repr(C)]
pub struct ModMask(pub u8);

impl ModMask {
    pub const NONE: ModMask = ModMask(0);
    pub const CTRL: ModMask = ModMask(0x01);
    pub const SHIFT: ModMask = ModMask(0x02);
    pub const ALT: ModMask = ModMask(0x04);
    pub const ALTGR: ModMask = ModMask(0x08);
    pub const META: ModMask = ModMask(0x10);

    pub const fn contains(self, bit: ModMask) -> bool {
        self.0 & bit.0 == bit.0
    }

    pub const fn union(self, other: ModMask) -> ModMask {
        ModMask(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One entry of the static modifier table: a bit and the canonical output
/// code asserted/cleared for it.
pub struct ModifierTableEntry {
    pub mask: ModMask,
    pub code: KeyCode,
}

/// Canonical modifier → key code mapping, in the order `set_mods` issues
/// edges.
pub const MODIFIER_TABLE: [ModifierTableEntry; 5] = [
    ModifierTableEntry { mask: ModMask::CTRL, code: keys::LEFTCTRL },
    ModifierTableEntry { mask: ModMask::SHIFT, code: keys::LEFTSHIFT },
    ModifierTableEntry { mask: ModMask::ALT, code: keys::LEFTALT },
    ModifierTableEntry { mask: ModMask::ALTGR, code: keys::RIGHTALT },
    ModifierTableEntry { mask: ModMask::META, code: keys::LEFTMETA },
];

/// Codes which, released standalone (nothing pressed since), get the
/// modifier-guard treatment (see `runtime::modifier`).
pub const GUARD_CODES: [KeyCode; 3] = [keys::LEFTMETA, keys::LEFTALT, keys::RIGHTALT];

/// Semantic version of the compiled configuration format.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn current() -> Self {
        Self { major: 1, minor: 0, patch: 0 }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Descriptor operation tag. See spec §3 for the meaning of each.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Op {
    #[default]
    Null = 0,
    KeySequence,
    Layer,
    LayerM,
    OneShot,
    OneShotM,
    Toggle,
    ToggleM,
    Layout,
    Overload,
    OverloadTimeout,
    OverloadTimeoutTap,
    OverloadIdleTimeout,
    Timeout,
    Macro,
    Macro2,
    Swap,
    SwapM,
    Clear,
    ClearM,
    Command,
    Scroll,
    ScrollToggle,
}

/// One untyped descriptor argument slot. Interpretation depends on `op`;
/// this avoids a vtable or per-op struct, matching the "fixed 3-slot
/// discriminated union" design note.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[repr(C)]
pub struct DescArg(pub u32);

impl DescArg {
    pub const fn code(self) -> KeyCode {
        self.0 as KeyCode
    }

    pub const fn idx(self) -> u16 {
        self.0 as u16
    }

    pub const fn mods(self) -> ModMask {
        ModMask(self.0 as u8)
    }

    pub const fn timeout(self) -> u64 {
        self.0 as u64
    }

    pub const fn sensitivity(self) -> i32 {
        self.0 as i32
    }

    pub const fn from_code(code: KeyCode) -> Self {
        Self(code as u32)
    }

    pub const fn from_idx(idx: u16) -> Self {
        Self(idx as u32)
    }

    pub const fn from_mods(mods: ModMask) -> Self {
        Self(mods.0 as u32)
    }

    pub const fn from_timeout(timeout_ms: u64) -> Self {
        Self(timeout_ms as u32)
    }

    pub const fn from_sensitivity(v: i32) -> Self {
        Self(v as u32)
    }
}

/// A tagged action bound to a key. `args` slots are populated/read
/// positionally per `op`; see spec §4.8 for per-op semantics.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct Descriptor {
    pub op: Op,
    pub args: [DescArg; 3],
}

impl Descriptor {
    pub const NULL: Descriptor = Descriptor { op: Op::Null, args: [DescArg(0); 3] };

    pub const fn is_null(&self) -> bool {
        matches!(self.op, Op::Null)
    }

    pub const fn keysequence(code: KeyCode, mods: ModMask) -> Self {
        Self {
            op: Op::KeySequence,
            args: [DescArg::from_code(code), DescArg::from_mods(mods), DescArg(0)],
        }
    }

    pub const fn layer(idx: u16) -> Self {
        Self { op: Op::Layer, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] }
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::NULL
    }
}

/// The kind of a [`Layer`]. Exactly one `Layout` layer is active at a time.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum LayerType {
    Normal = 0,
    Layout = 1,
    Composite = 2,
}

/// A set of up to [`MAX_CHORD_KEYS`] physical codes bound to a descriptor.
/// Unused slots are `0`.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct Chord {
    pub keys: [KeyCode; MAX_CHORD_KEYS],
    pub descriptor: Descriptor,
}

impl Chord {
    /// Number of non-zero (occupied) key slots.
    pub fn len(&self) -> usize {
        self.keys.iter().filter(|&&k| k != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        self.keys.iter().any(|&k| k == code && k != 0)
    }
}

/// One entry of a macro sequence. See spec §4.9.
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum MacroEntry {
    KeySequence { code: KeyCode, mods: ModMask },
    Hold(KeyCode),
    Release,
    Unicode(u32),
    Timeout(u32),
    Command(u16),
}

pub type Macro = Vec<MacroEntry>;

/// A shell command string, dispatched via the external command runner.
pub type Command = String;

/// A named remapping table.
#[derive(Archive, Serialize, Deserialize, Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub kind: LayerType,
    pub mods: ModMask,
    pub keymap: Vec<Descriptor>,
    pub chords: Vec<Chord>,
    /// Constituent layer indices; only meaningful for `LayerType::Composite`.
    pub constituents: Vec<u16>,
}

impl Layer {
    pub fn binding(&self, code: KeyCode) -> &Descriptor {
        self.keymap.get(code as usize).unwrap_or(&Descriptor::NULL)
    }
}

/// Global, config-wide tunables (the `[global]` section of the text format).
#[derive(Archive, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct GlobalConfig {
    pub oneshot_timeout_ms: u64,
    pub macro_timeout_ms: u64,
    pub macro_repeat_timeout_ms: u64,
    pub macro_sequence_timeout_ms: u64,
    pub overload_tap_timeout_ms: u64,
    pub chord_interkey_timeout_ms: u64,
    pub chord_hold_timeout_ms: u64,
    pub disable_modifier_guard: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            oneshot_timeout_ms: 0,
            macro_timeout_ms: 600,
            macro_repeat_timeout_ms: 50,
            macro_sequence_timeout_ms: 0,
            overload_tap_timeout_ms: 200,
            chord_interkey_timeout_ms: 50,
            chord_hold_timeout_ms: 0,
            disable_modifier_guard: false,
        }
    }
}

/// A fully compiled configuration: every layer, macro, command and tunable
/// needed to run a [`crate::runtime::Keyboard`].
#[derive(Archive, Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub version: Version,
    pub layers: Vec<Layer>,
    /// Indirect descriptor pool referenced by index from `args[n].idx()`
    /// (overload/timeout alternate actions).
    pub descriptors: Vec<Descriptor>,
    pub macros: Vec<Macro>,
    pub commands: Vec<Command>,
    pub global: GlobalConfig,
    /// Index of the layer activated by default (must be `LayerType::Layout`).
    pub default_layout: Option<u16>,
}

impl Config {
    /// An empty configuration with only layer 0 (the mandatory, always-active
    /// `Layout` layer).
    pub fn empty() -> Self {
        Self {
            version: Version::current(),
            layers: alloc::vec![Layer {
                name: String::from("main"),
                kind: LayerType::Layout,
                mods: ModMask::NONE,
                keymap: alloc::vec![Descriptor::NULL; 256],
                chords: Vec::new(),
                constituents: Vec::new(),
            }],
            descriptors: Vec::new(),
            macros: Vec::new(),
            commands: Vec::new(),
            global: GlobalConfig::default(),
            default_layout: None,
        }
    }
}
