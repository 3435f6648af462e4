//! `parse` subcommand: parses a keyd-style text configuration and displays
//! its structure, either as a human-readable summary or as JSON.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::ParseError as ParserParseError;
use crate::parser::Parser;

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ParseCommandError {
    ParseError(ParserParseError),
    JsonError(serde_json::Error),
    IoError(io::Error),
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(err) => write!(f, "{err}"),
            Self::JsonError(err) => write!(f, "JSON serialization error: {err}"),
            Self::IoError(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ParseCommandError {}

impl From<io::Error> for ParseCommandError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<ParserParseError> for ParseCommandError {
    fn from(err: ParserParseError) -> Self {
        Self::ParseError(err)
    }
}

impl From<serde_json::Error> for ParseCommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err)
    }
}

#[derive(Serialize)]
struct LayerSummary {
    name: String,
    kind: &'static str,
    bound_keys: usize,
    chords: usize,
}

#[derive(Serialize)]
struct ConfigSummary {
    layers: Vec<LayerSummary>,
    macros: usize,
    commands: usize,
    descriptors: usize,
    global: GlobalSummary,
}

#[derive(Serialize)]
struct GlobalSummary {
    oneshot_timeout_ms: u64,
    macro_timeout_ms: u64,
    macro_repeat_timeout_ms: u64,
    macro_sequence_timeout_ms: u64,
    overload_tap_timeout_ms: u64,
    chord_interkey_timeout_ms: u64,
    chord_hold_timeout_ms: u64,
    disable_modifier_guard: bool,
}

pub fn handle_parse(input: &Path, json: bool) -> Result<(), ParseCommandError> {
    let source = fs::read_to_string(input)
        .map_err(|e| ParserParseError::Io { path: input.display().to_string(), message: e.to_string() })?;

    let (config, _state) = Parser::parse(&source)?;

    let summary = ConfigSummary {
        layers: config
            .layers
            .iter()
            .map(|layer| LayerSummary {
                name: layer.name.clone(),
                kind: match layer.kind {
                    keyrx_core::config::LayerType::Normal => "normal",
                    keyrx_core::config::LayerType::Layout => "layout",
                    keyrx_core::config::LayerType::Composite => "composite",
                },
                bound_keys: layer.keymap.iter().filter(|d| !d.is_null()).count(),
                chords: layer.chords.len(),
            })
            .collect(),
        macros: config.macros.len(),
        commands: config.commands.len(),
        descriptors: config.descriptors.len(),
        global: GlobalSummary {
            oneshot_timeout_ms: config.global.oneshot_timeout_ms,
            macro_timeout_ms: config.global.macro_timeout_ms,
            macro_repeat_timeout_ms: config.global.macro_repeat_timeout_ms,
            macro_sequence_timeout_ms: config.global.macro_sequence_timeout_ms,
            overload_tap_timeout_ms: config.global.overload_tap_timeout_ms,
            chord_interkey_timeout_ms: config.global.chord_interkey_timeout_ms,
            chord_hold_timeout_ms: config.global.chord_hold_timeout_ms,
            disable_modifier_guard: config.global.disable_modifier_guard,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("layers:");
        for layer in &summary.layers {
            println!("  {} ({}) - {} bound key(s), {} chord(s)", layer.name, layer.kind, layer.bound_keys, layer.chords);
        }
        println!("macros: {}, commands: {}, descriptors: {}", summary.macros, summary.commands, summary.descriptors);
        println!(
            "global: oneshot_timeout={}ms macro_timeout={}ms overload_tap_timeout={}ms disable_modifier_guard={}",
            summary.global.oneshot_timeout_ms,
            summary.global.macro_timeout_ms,
            summary.global.overload_tap_timeout_ms,
            summary.global.disable_modifier_guard
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn human_readable_summary_succeeds() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("config.krxc");
        fs::write(&input, "[main]\na = b\n").unwrap();
        assert!(handle_parse(&input, false).is_ok());
    }

    #[test]
    fn json_summary_succeeds() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("config.krxc");
        fs::write(&input, "[main]\na = b\n").unwrap();
        assert!(handle_parse(&input, true).is_ok());
    }

    #[test]
    fn propagates_parse_errors() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("config.krxc");
        fs::write(&input, "[main]\nnotakey = esc\n").unwrap();
        assert!(matches!(handle_parse(&input, false), Err(ParseCommandError::ParseError(_))));
    }
}
