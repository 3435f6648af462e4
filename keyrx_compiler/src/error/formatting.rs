//! Colored terminal formatting for parse errors, with a source-line snippet
//! and a `help:` suggestion. Respects `NO_COLOR`.

use crate::error::types::ParseError;
use colored::*;

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Formats a `ParseError` with a source snippet and a help suggestion.
pub fn format_error(error: &ParseError, path: &str, source: &str) -> String {
    let mut out = String::new();

    if let Some(line) = error_line(error) {
        out.push_str(&format!("{}\n", format!("{path}:{line}").blue()));
        out.push_str(&format_snippet(source, line));
    }

    out.push_str(&format!("{} {}\n", "error:".red().bold(), error));

    if let Some(help) = suggestion(error) {
        out.push_str(&format!("{} {}\n", "help:".green().bold(), help));
    }

    out
}

fn error_line(error: &ParseError) -> Option<usize> {
    match error {
        ParseError::Syntax { line, .. }
        | ParseError::UnknownKeyName { line, .. }
        | ParseError::UnknownVerb { line, .. }
        | ParseError::WrongArgumentCount { line, .. }
        | ParseError::InvalidNumber { line, .. }
        | ParseError::UnknownLayerRef { line, .. }
        | ParseError::DuplicateLayer { line, .. }
        | ParseError::ChordTooManyKeys { line, .. }
        | ParseError::UnknownGlobalKey { line, .. }
        | ParseError::InvalidGlobalValue { line, .. }
        | ParseError::UnclosedCall { line, .. } => Some(*line),
        ParseError::Io { .. } | ParseError::NoLayersDefined => None,
    }
}

fn format_snippet(source: &str, error_line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return String::new();
    }

    let start = error_line.saturating_sub(2).max(1);
    let end = (error_line + 1).min(lines.len());
    let mut out = String::new();

    for n in start..=end {
        let content = lines[n - 1];
        if n == error_line {
            out.push_str(&format!("{:>4} | {}\n", n.to_string().blue().bold(), content));
        } else {
            out.push_str(&format!("{:>4} | {}\n", n.to_string().blue(), content));
        }
    }

    out
}

fn suggestion(error: &ParseError) -> Option<String> {
    match error {
        ParseError::UnknownKeyName { name, .. } => {
            Some(format!("'{name}' isn't a recognized key name; check spelling and case"))
        }
        ParseError::UnknownVerb { verb, .. } => Some(format!(
            "'{verb}' isn't a recognized descriptor verb (e.g. layer, oneshot, toggle, overload, macro, cmd)"
        )),
        ParseError::WrongArgumentCount { verb, expected, .. } => {
            Some(format!("{verb}() expects {expected}"))
        }
        ParseError::UnknownLayerRef { name, .. } => {
            Some(format!("declare a [{name}] section before referencing it"))
        }
        ParseError::DuplicateLayer { name, .. } => {
            Some(format!("merge the bindings into a single [{name}] section"))
        }
        ParseError::ChordTooManyKeys { max, .. } => {
            Some(format!("split the chord, or drop keys down to {max} or fewer"))
        }
        ParseError::UnknownGlobalKey { .. } => Some(
            "valid [global] keys: oneshot_timeout, macro_timeout, macro_repeat_timeout, \
             overload_tap_timeout, chord_interkey_timeout, chord_hold_timeout, disable_modifier_guard"
                .to_string(),
        ),
        ParseError::InvalidGlobalValue { key, .. } if key == "disable_modifier_guard" => {
            Some("expected 'true' or 'false'".to_string())
        }
        ParseError::InvalidGlobalValue { .. } => Some("expected an integer number of milliseconds".to_string()),
        ParseError::UnclosedCall { verb, .. } => Some(format!("add the missing ')' to close {verb}(...)")),
        ParseError::NoLayersDefined => {
            Some("add at least one [layer_name] section with key bindings".to_string())
        }
        _ => None,
    }
}
