use crate::error::formatting::hex_encode;
use crate::error::types::{DeserializeError, ParseError, SerializeError};
use std::error::Error;
use std::fmt;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io { path, message } => write!(f, "{path}: {message}"),
            ParseError::Syntax { line, message } => write!(f, "line {line}: {message}"),
            ParseError::UnknownKeyName { line, name } => {
                write!(f, "line {line}: unknown key name '{name}'")
            }
            ParseError::UnknownVerb { line, verb } => {
                write!(f, "line {line}: unknown descriptor verb '{verb}'")
            }
            ParseError::WrongArgumentCount { line, verb, expected, got } => write!(
                f,
                "line {line}: {verb}() takes {expected}, got {got} argument(s)"
            ),
            ParseError::InvalidNumber { line, text } => {
                write!(f, "line {line}: '{text}' is not a valid number")
            }
            ParseError::UnknownLayerRef { line, name } => {
                write!(f, "line {line}: no [{name}] layer is declared")
            }
            ParseError::DuplicateLayer { line, name } => {
                write!(f, "line {line}: layer '{name}' is declared more than once")
            }
            ParseError::ChordTooManyKeys { line, count, max } => write!(
                f,
                "line {line}: chord names {count} keys, but at most {max} are supported"
            ),
            ParseError::UnknownGlobalKey { line, key } => {
                write!(f, "line {line}: unknown [global] key '{key}'")
            }
            ParseError::InvalidGlobalValue { line, key, value } => {
                write!(f, "line {line}: '{value}' is not a valid value for '{key}'")
            }
            ParseError::UnclosedCall { line, verb } => {
                write!(f, "line {line}: {verb}(...) is missing its closing ')'")
            }
            ParseError::NoLayersDefined => write!(f, "configuration declares no layers"),
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::RkyvError(msg) => write!(f, "serialization error: {msg}"),
            SerializeError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl Error for SerializeError {}

impl From<std::io::Error> for SerializeError {
    fn from(err: std::io::Error) -> Self {
        SerializeError::IoError(err.to_string())
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserializeError::InvalidMagic { expected, got } => {
                write!(f, "invalid magic bytes: expected {expected:?}, got {got:?}")
            }
            DeserializeError::VersionMismatch { expected, got } => {
                write!(f, "version mismatch: expected {expected}, got {got}")
            }
            DeserializeError::HashMismatch { expected, computed } => write!(
                f,
                "hash mismatch (data corruption detected):\n  expected: {}\n  computed: {}",
                hex_encode(expected),
                hex_encode(computed)
            ),
            DeserializeError::RkyvError(msg) => write!(f, "deserialization error: {msg}"),
            DeserializeError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl Error for DeserializeError {}

impl From<std::io::Error> for DeserializeError {
    fn from(err: std::io::Error) -> Self {
        DeserializeError::IoError(err.to_string())
    }
}
