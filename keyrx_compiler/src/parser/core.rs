//! Two-pass line-oriented parser for keyd-style text configurations.
//!
//! Pass one walks the source collecting `[layer_name]` section headers in
//! declaration order, so a binding can reference a layer declared later in
//! the file. Pass two walks it again, filling in each layer's keymap and
//! chords and the `[global]` tunables block.

use std::collections::HashMap;

use keyrx_core::config::{Chord, Config, GlobalConfig, Layer, LayerType, MAX_CHORD_KEYS};

use crate::error::ParseError;
use crate::parser::descriptor::{parse_descriptor, BuildCtx};
use crate::parser::validators::parse_key_name;

/// Parse-time state, exposed so the `parse` CLI subcommand can report
/// structural details (layer names in declaration order) beyond the
/// finished `Config`.
#[derive(Debug, Default)]
pub struct ParserState {
    pub layer_names: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Layer(usize),
    Global,
}

pub struct Parser;

impl Parser {
    /// Parses `source` into a `Config`.
    pub fn parse(source: &str) -> Result<(Config, ParserState), ParseError> {
        let layer_names = Self::collect_layer_names(source)?;
        if layer_names.is_empty() {
            return Err(ParseError::NoLayersDefined);
        }

        let layer_index: HashMap<String, u16> = layer_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as u16))
            .collect();

        let mut layers: Vec<Layer> = layer_names
            .iter()
            .map(|name| Layer {
                name: name.clone(),
                kind: LayerType::Normal,
                mods: keyrx_core::config::ModMask::NONE,
                keymap: vec![keyrx_core::config::Descriptor::NULL; 256],
                chords: Vec::new(),
                constituents: Vec::new(),
            })
            .collect();
        layers[0].kind = LayerType::Layout;

        let mut descriptors = Vec::new();
        let mut macros = Vec::new();
        let mut commands = Vec::new();
        let mut global = GlobalConfig::default();

        let mut section = Section::Layer(0);

        for (lineno, raw_line) in source.lines().enumerate() {
            let line = lineno + 1;
            let trimmed = strip_comment(raw_line).trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let header = header.trim();
                section = if header.eq_ignore_ascii_case("global") {
                    Section::Global
                } else {
                    Section::Layer(*layer_index.get(header).expect("collected in pass one"))
                };
                continue;
            }

            match section {
                Section::Global => {
                    parse_global_line(line, trimmed, &mut global)?;
                }
                Section::Layer(idx) => {
                    if let Some(rest) = trimmed.strip_prefix("chord ") {
                        let chord = parse_chord_line(
                            line,
                            rest,
                            &mut BuildCtx {
                                layer_index: &layer_index,
                                descriptors: &mut descriptors,
                                macros: &mut macros,
                                commands: &mut commands,
                            },
                        )?;
                        layers[idx].chords.push(chord);
                        continue;
                    }

                    let (key_text, desc_text) = split_binding(line, trimmed)?;
                    let code = parse_key_name(key_text)
                        .ok_or_else(|| ParseError::UnknownKeyName { line, name: key_text.to_string() })?;
                    let descriptor = parse_descriptor(
                        line,
                        desc_text,
                        &mut BuildCtx {
                            layer_index: &layer_index,
                            descriptors: &mut descriptors,
                            macros: &mut macros,
                            commands: &mut commands,
                        },
                    )?;
                    layers[idx].keymap[code as usize] = descriptor;
                }
            }
        }

        let config = Config {
            version: keyrx_core::config::Version::current(),
            layers,
            descriptors,
            macros,
            commands,
            global,
            default_layout: Some(0),
        };

        Ok((config, ParserState { layer_names }))
    }

    fn collect_layer_names(source: &str) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for (lineno, raw_line) in source.lines().enumerate() {
            let line = lineno + 1;
            let trimmed = strip_comment(raw_line).trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let header = header.trim();
                if header.eq_ignore_ascii_case("global") {
                    continue;
                }
                if !seen.insert(header.to_string()) {
                    return Err(ParseError::DuplicateLayer { line, name: header.to_string() });
                }
                names.push(header.to_string());
            }
        }

        Ok(names)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn split_binding(line: usize, trimmed: &str) -> Result<(&str, &str), ParseError> {
    let eq = trimmed
        .find('=')
        .ok_or_else(|| ParseError::Syntax { line, message: "expected 'key = descriptor'".to_string() })?;
    Ok((trimmed[..eq].trim(), trimmed[eq + 1..].trim()))
}

fn parse_chord_line(line: usize, rest: &str, ctx: &mut BuildCtx) -> Result<Chord, ParseError> {
    let eq = rest
        .find('=')
        .ok_or_else(|| ParseError::Syntax { line, message: "expected 'chord k1+k2+... = descriptor'".to_string() })?;
    let (keys_text, desc_text) = (rest[..eq].trim(), rest[eq + 1..].trim());

    let names: Vec<&str> = keys_text.split('+').map(str::trim).collect();
    if names.len() > MAX_CHORD_KEYS {
        return Err(ParseError::ChordTooManyKeys { line, count: names.len(), max: MAX_CHORD_KEYS });
    }

    let mut keys = [0u8; MAX_CHORD_KEYS];
    for (i, name) in names.iter().enumerate() {
        keys[i] =
            parse_key_name(name).ok_or_else(|| ParseError::UnknownKeyName { line, name: (*name).to_string() })?;
    }

    let descriptor = parse_descriptor(line, desc_text, ctx)?;
    Ok(Chord { keys, descriptor })
}

fn parse_global_line(line: usize, trimmed: &str, global: &mut GlobalConfig) -> Result<(), ParseError> {
    let (key, value) = split_binding(line, trimmed)?;
    match key {
        "oneshot_timeout" => global.oneshot_timeout_ms = parse_global_ms(line, key, value)?,
        "macro_timeout" => global.macro_timeout_ms = parse_global_ms(line, key, value)?,
        "macro_repeat_timeout" => global.macro_repeat_timeout_ms = parse_global_ms(line, key, value)?,
        "macro_sequence_timeout" => global.macro_sequence_timeout_ms = parse_global_ms(line, key, value)?,
        "overload_tap_timeout" => global.overload_tap_timeout_ms = parse_global_ms(line, key, value)?,
        "chord_interkey_timeout" => global.chord_interkey_timeout_ms = parse_global_ms(line, key, value)?,
        "chord_hold_timeout" => global.chord_hold_timeout_ms = parse_global_ms(line, key, value)?,
        "disable_modifier_guard" => {
            global.disable_modifier_guard = match value {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ParseError::InvalidGlobalValue {
                        line,
                        key: key.to_string(),
                        value: value.to_string(),
                    })
                }
            };
        }
        _ => return Err(ParseError::UnknownGlobalKey { line, key: key.to_string() }),
    }
    Ok(())
}

fn parse_global_ms(line: usize, key: &str, value: &str) -> Result<u64, ParseError> {
    value
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidGlobalValue { line, key: key.to_string(), value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_layer_with_one_binding() {
        let src = "[main]\na = b\n";
        let (config, state) = Parser::parse(src).unwrap();
        assert_eq!(state.layer_names, vec!["main".to_string()]);
        assert_eq!(config.layers[0].kind, LayerType::Layout);
        assert_eq!(config.layers[0].binding(keyrx_core::config::keys::A).op, keyrx_core::config::Op::KeySequence);
    }

    #[test]
    fn forward_layer_reference_resolves() {
        let src = "[main]\ncapslock = layer(nav)\n\n[nav]\nh = left\n";
        let (config, _) = Parser::parse(src).unwrap();
        let binding = config.layers[0].binding(keyrx_core::config::keys::CAPSLOCK);
        assert_eq!(binding.op, keyrx_core::config::Op::Layer);
        assert_eq!(binding.args[0].idx(), 1);
    }

    #[test]
    fn global_section_overrides_defaults() {
        let src = "[main]\na = b\n\n[global]\noneshot_timeout = 250\ndisable_modifier_guard = true\n";
        let (config, _) = Parser::parse(src).unwrap();
        assert_eq!(config.global.oneshot_timeout_ms, 250);
        assert!(config.global.disable_modifier_guard);
    }

    #[test]
    fn chord_line_builds_a_chord_entry() {
        let src = "[main]\nchord j+k = esc\n";
        let (config, _) = Parser::parse(src).unwrap();
        assert_eq!(config.layers[0].chords.len(), 1);
        assert_eq!(config.layers[0].chords[0].len(), 2);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let src = "# top comment\n[main]\n\na = b # trailing\n";
        let (config, _) = Parser::parse(src).unwrap();
        assert_eq!(config.layers[0].binding(keyrx_core::config::keys::A).op, keyrx_core::config::Op::KeySequence);
    }

    #[test]
    fn duplicate_layer_header_is_an_error() {
        let src = "[main]\na = b\n[main]\nc = d\n";
        assert!(matches!(Parser::parse(src), Err(ParseError::DuplicateLayer { .. })));
    }

    #[test]
    fn empty_source_has_no_layers() {
        assert!(matches!(Parser::parse(""), Err(ParseError::NoLayersDefined)));
    }

    #[test]
    fn unknown_key_name_on_lhs_is_an_error() {
        let src = "[main]\nnotakey = esc\n";
        assert!(matches!(Parser::parse(src), Err(ParseError::UnknownKeyName { .. })));
    }
}
