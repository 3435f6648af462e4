/// Errors that can occur while parsing a keyd-style text configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The configuration file could not be read.
    Io { path: String, message: String },

    /// A line matched no recognized grammar (section header, binding,
    /// chord, or global tunable).
    Syntax { line: usize, message: String },

    /// A key name on the left or right of a binding isn't in the key table.
    UnknownKeyName { line: usize, name: String },

    /// A descriptor verb (e.g. `overload`, `oneshot`) isn't recognized.
    UnknownVerb { line: usize, verb: String },

    /// A descriptor verb was called with the wrong number of arguments.
    WrongArgumentCount { line: usize, verb: String, expected: &'static str, got: usize },

    /// A numeric argument (timeout, sensitivity) failed to parse.
    InvalidNumber { line: usize, text: String },

    /// A `layer(name)`-style reference named a layer that was never
    /// declared with a `[name]` section.
    UnknownLayerRef { line: usize, name: String },

    /// The same `[name]` section header appeared twice.
    DuplicateLayer { line: usize, name: String },

    /// A chord definition named more physical keys than the core supports.
    ChordTooManyKeys { line: usize, count: usize, max: usize },

    /// An unrecognized key under `[global]`.
    UnknownGlobalKey { line: usize, key: String },

    /// A `[global]` value wasn't a valid tunable value (e.g. not `true`/`false`).
    InvalidGlobalValue { line: usize, key: String, value: String },

    /// A `macro(...)`/`cmd(...)`-style call was missing its closing paren.
    UnclosedCall { line: usize, verb: String },

    /// The configuration declared no layers at all.
    NoLayersDefined,
}

/// Errors that can occur during serialization to the `.krx` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    RkyvError(String),
    IoError(String),
}

/// Errors that can occur while validating/deserializing a `.krx` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeserializeError {
    InvalidMagic { expected: [u8; 4], got: [u8; 4] },
    VersionMismatch { expected: u32, got: u32 },
    HashMismatch { expected: [u8; 32], computed: [u8; 32] },
    RkyvError(String),
    IoError(String),
}
