//! `view` subcommand: renders a configuration's layers and bindings as
//! plain text (one line per bound key, grouped by layer).

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use colored::*;

use crate::error::ParseError as ParserParseError;
use crate::parser::{key_name, Parser};
use keyrx_core::config::{Config, LayerType, Op};

#[derive(Debug)]
pub enum ViewError {
    ParseError(ParserParseError),
    IoError(io::Error),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(err) => write!(f, "{err}"),
            Self::IoError(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ViewError {}

impl From<io::Error> for ViewError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<ParserParseError> for ViewError {
    fn from(err: ParserParseError) -> Self {
        Self::ParseError(err)
    }
}

pub fn handle_view(input: &Path) -> Result<(), ViewError> {
    let source = fs::read_to_string(input)
        .map_err(|e| ParserParseError::Io { path: input.display().to_string(), message: e.to_string() })?;

    let (config, _state) = Parser::parse(&source)?;
    print!("{}", render(&config));

    Ok(())
}

fn render(config: &Config) -> String {
    let mut out = String::new();

    for layer in &config.layers {
        let kind = match layer.kind {
            LayerType::Normal => "normal",
            LayerType::Layout => "layout",
            LayerType::Composite => "composite",
        };
        out.push_str(&format!("{}\n", format!("[{}] ({kind})", layer.name).blue().bold()));

        for (code, descriptor) in layer.keymap.iter().enumerate() {
            if descriptor.is_null() {
                continue;
            }
            out.push_str(&format!(
                "  {} -> {}\n",
                key_name(code as u8).green(),
                describe(descriptor.op, config)
            ));
        }

        for chord in &layer.chords {
            let names: Vec<String> = chord.keys.iter().filter(|&&k| k != 0).map(|&k| key_name(k)).collect();
            out.push_str(&format!(
                "  chord {} -> {}\n",
                names.join("+").green(),
                describe(chord.descriptor.op, config)
            ));
        }
    }

    out
}

fn describe(op: Op, config: &Config) -> String {
    match op {
        Op::Null => "none".to_string(),
        Op::KeySequence => "key".to_string(),
        Op::Layer => "layer".to_string(),
        Op::LayerM => "layer+macro".to_string(),
        Op::OneShot => "oneshot".to_string(),
        Op::OneShotM => "oneshot+macro".to_string(),
        Op::Toggle => "toggle".to_string(),
        Op::ToggleM => "toggle+macro".to_string(),
        Op::Layout => "layout".to_string(),
        Op::Overload => "overload".to_string(),
        Op::OverloadTimeout => "overload(timeout)".to_string(),
        Op::OverloadTimeoutTap => "overload(timeout-tap)".to_string(),
        Op::OverloadIdleTimeout => "overload(idle-timeout)".to_string(),
        Op::Timeout => "timeout".to_string(),
        Op::Macro => format!("macro ({} known)", config.macros.len()),
        Op::Macro2 => "macro2".to_string(),
        Op::Swap => "swap".to_string(),
        Op::SwapM => "swap+macro".to_string(),
        Op::Clear => "clear".to_string(),
        Op::ClearM => "clear+macro".to_string(),
        Op::Command => format!("command ({} known)", config.commands.len()),
        Op::Scroll => "scroll".to_string(),
        Op::ScrollToggle => "scrolltoggle".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_bound_key() {
        let (config, _) = Parser::parse("[main]\na = b\n").unwrap();
        let text = render(&config);
        assert!(text.contains("main"));
        assert!(text.contains("a"));
    }

    #[test]
    fn renders_a_chord() {
        let (config, _) = Parser::parse("[main]\nchord j+k = esc\n").unwrap();
        let text = render(&config);
        assert!(text.contains("chord"));
    }
}
