//! Parses the right-hand side of a binding line (`key = <descriptor>`) into
//! a `keyrx_core::config::Descriptor`.
//!
//! A descriptor is one of:
//!   - a bare key name, optionally `C-`/`S-`/`A-`/`G-`/`M-` prefixed, which
//!     compiles directly to `Op::KeySequence`
//!   - `none`/`null`, which compiles to `Descriptor::NULL`
//!   - a `verb(arg, arg, ...)` call naming one of the core's non-keysequence
//!     ops
//!   - anything else (whitespace-separated tokens, `type()`/`cmd()` calls)
//!     is treated as a macro body and compiles to `Op::Macro`

use std::collections::HashMap;

use keyrx_core::config::{Command, DescArg, Descriptor, Macro, ModMask, Op};

use crate::error::ParseError;
use crate::parser::macro_grammar::parse_macro;
use crate::parser::validators::parse_key_name;

/// Parse-time context threaded through descriptor construction: the
/// layer-name → index map (built in the parser's first pass) and the
/// indirect pools a `Config` carries alongside its layers.
pub struct BuildCtx<'a> {
    pub layer_index: &'a HashMap<String, u16>,
    pub descriptors: &'a mut Vec<Descriptor>,
    pub macros: &'a mut Vec<Macro>,
    pub commands: &'a mut Vec<Command>,
}

impl<'a> BuildCtx<'a> {
    fn resolve_layer(&self, line: usize, name: &str) -> Result<u16, ParseError> {
        self.layer_index
            .get(name.trim())
            .copied()
            .ok_or_else(|| ParseError::UnknownLayerRef { line, name: name.trim().to_string() })
    }
}

const SINGLE_ACTION_VERBS: &[&str] = &[
    "layer", "oneshot", "toggle", "layout", "overload", "timeout", "macro", "cmd", "command",
    "swap", "clear", "scroll", "scrolltoggle",
];

/// Splits `verb(args)` into `(verb, inner)`, returning `None` if the text
/// isn't a verb-call (no `(...)` at the top level, or the verb isn't one of
/// ours).
fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    if !text.ends_with(')') {
        return None;
    }
    let verb = &text[..open];
    if verb.is_empty() || !verb.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    if !SINGLE_ACTION_VERBS.contains(&verb) {
        return None;
    }
    Some((verb, &text[open + 1..text.len() - 1]))
}

/// Splits a verb's argument list on top-level commas (depth-0 parens).
fn split_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !args.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

fn parse_ms(line: usize, text: &str) -> Result<u64, ParseError> {
    let digits = text.strip_suffix("ms").unwrap_or(text);
    digits
        .trim()
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber { line, text: text.to_string() })
}

fn mod_prefixed_key(line: usize, text: &str) -> Result<(u8, ModMask), ParseError> {
    let mut mods = ModMask::NONE;
    let mut rest = text;

    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), Some('-')) if "CSAGM".contains(letter) => {
                mods = mods.union(match letter {
                    'C' => ModMask::CTRL,
                    'S' => ModMask::SHIFT,
                    'A' => ModMask::ALT,
                    'G' => ModMask::ALTGR,
                    'M' => ModMask::META,
                    _ => unreachable!(),
                });
                rest = &rest[2..];
            }
            _ => break,
        }
    }

    parse_key_name(rest)
        .map(|code| (code, mods))
        .ok_or_else(|| ParseError::UnknownKeyName { line, name: rest.to_string() })
}

/// Parses a standalone action sub-expression (used for `overload`/`timeout`
/// action arguments) into a pool index, pushing the built descriptor into
/// `ctx.descriptors`.
fn push_action(line: usize, text: &str, ctx: &mut BuildCtx) -> Result<u16, ParseError> {
    let descriptor = parse_descriptor(line, text, ctx)?;
    ctx.descriptors.push(descriptor);
    Ok((ctx.descriptors.len() - 1) as u16)
}

fn expect_args(line: usize, verb: &str, args: &[String], expected: &'static str, n: usize) -> Result<(), ParseError> {
    if args.len() != n {
        return Err(ParseError::WrongArgumentCount {
            line,
            verb: verb.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Parses one binding's right-hand side into a `Descriptor`.
pub fn parse_descriptor(line: usize, text: &str, ctx: &mut BuildCtx) -> Result<Descriptor, ParseError> {
    let text = text.trim();

    if text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("null") {
        return Ok(Descriptor::NULL);
    }

    if let Some((verb, inner)) = split_call(text) {
        let args = split_args(inner);
        return match verb {
            "layer" => {
                expect_args(line, verb, &args, "1 argument (layer name)", 1)?;
                Ok(Descriptor::layer(ctx.resolve_layer(line, &args[0])?))
            }
            "oneshot" => {
                expect_args(line, verb, &args, "1 argument (layer name)", 1)?;
                let idx = ctx.resolve_layer(line, &args[0])?;
                Ok(Descriptor { op: Op::OneShot, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "toggle" => {
                expect_args(line, verb, &args, "1 argument (layer name)", 1)?;
                let idx = ctx.resolve_layer(line, &args[0])?;
                Ok(Descriptor { op: Op::Toggle, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "layout" => {
                expect_args(line, verb, &args, "1 argument (layer name)", 1)?;
                let idx = ctx.resolve_layer(line, &args[0])?;
                Ok(Descriptor { op: Op::Layout, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "overload" => {
                expect_args(line, verb, &args, "2 arguments (layer name, tap action)", 2)?;
                let idx = ctx.resolve_layer(line, &args[0])?;
                let action = push_action(line, &args[1], ctx)?;
                Ok(Descriptor {
                    op: Op::Overload,
                    args: [DescArg::from_idx(idx), DescArg::from_idx(action), DescArg(0)],
                })
            }
            "timeout" => {
                expect_args(line, verb, &args, "3 arguments (tap action, hold action, timeout ms)", 3)?;
                let action1 = push_action(line, &args[0], ctx)?;
                let action2 = push_action(line, &args[1], ctx)?;
                let ms = parse_ms(line, &args[2])?;
                Ok(Descriptor {
                    op: Op::Timeout,
                    args: [
                        DescArg::from_idx(action1),
                        DescArg::from_timeout(ms),
                        DescArg::from_idx(action2),
                    ],
                })
            }
            "macro" => {
                expect_args(line, verb, &args, "1 argument (macro body)", 1)?;
                let entries = parse_macro(line, &args[0], ctx.commands)?;
                ctx.macros.push(entries);
                let idx = (ctx.macros.len() - 1) as u16;
                Ok(Descriptor { op: Op::Macro, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "cmd" | "command" => {
                expect_args(line, verb, &args, "1 argument (shell command)", 1)?;
                ctx.commands.push(args[0].clone());
                let idx = (ctx.commands.len() - 1) as u16;
                Ok(Descriptor { op: Op::Command, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "swap" => {
                expect_args(line, verb, &args, "1 argument (layer name)", 1)?;
                let idx = ctx.resolve_layer(line, &args[0])?;
                Ok(Descriptor { op: Op::Swap, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
            }
            "clear" => {
                expect_args(line, verb, &args, "0 arguments", 0)?;
                Ok(Descriptor { op: Op::Clear, args: [DescArg(0); 3] })
            }
            "scroll" => {
                expect_args(line, verb, &args, "1 argument (sensitivity)", 1)?;
                let sensitivity: i32 = args[0]
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { line, text: args[0].clone() })?;
                Ok(Descriptor {
                    op: Op::Scroll,
                    args: [DescArg::from_sensitivity(sensitivity), DescArg(0), DescArg(0)],
                })
            }
            "scrolltoggle" => {
                expect_args(line, verb, &args, "1 argument (sensitivity)", 1)?;
                let sensitivity: i32 = args[0]
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { line, text: args[0].clone() })?;
                Ok(Descriptor {
                    op: Op::ScrollToggle,
                    args: [DescArg::from_sensitivity(sensitivity), DescArg(0), DescArg(0)],
                })
            }
            _ => unreachable!("split_call only returns verbs in SINGLE_ACTION_VERBS"),
        };
    }

    if !text.contains(char::is_whitespace) && !text.starts_with("type(") && !text.starts_with("txt(") {
        if let Some(code) = parse_key_name(text) {
            return Ok(Descriptor::keysequence(code, ModMask::NONE));
        }
        if text.contains('-') {
            if let Ok((code, mods)) = mod_prefixed_key(line, text) {
                return Ok(Descriptor::keysequence(code, mods));
            }
        }
    }

    let entries = parse_macro(line, text, ctx.commands)?;
    ctx.macros.push(entries);
    let idx = (ctx.macros.len() - 1) as u16;
    Ok(Descriptor { op: Op::Macro, args: [DescArg::from_idx(idx), DescArg(0), DescArg(0)] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        layer_index: &'a HashMap<String, u16>,
        descriptors: &'a mut Vec<Descriptor>,
        macros: &'a mut Vec<Macro>,
        commands: &'a mut Vec<Command>,
    ) -> BuildCtx<'a> {
        BuildCtx { layer_index, descriptors, macros, commands }
    }

    #[test]
    fn bare_key_is_keysequence() {
        let layers = HashMap::new();
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "a", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::KeySequence);
    }

    #[test]
    fn mod_prefixed_key_carries_mods() {
        let layers = HashMap::new();
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "C-c", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::KeySequence);
        assert!(desc.args[1].mods().contains(ModMask::CTRL));
    }

    #[test]
    fn layer_call_resolves_index() {
        let mut layers = HashMap::new();
        layers.insert("nav".to_string(), 1u16);
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "layer(nav)", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::Layer);
        assert_eq!(desc.args[0].idx(), 1);
    }

    #[test]
    fn unknown_layer_reference_is_an_error() {
        let layers = HashMap::new();
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        assert!(parse_descriptor(1, "layer(nope)", &mut ctx(&layers, &mut d, &mut m, &mut c)).is_err());
    }

    #[test]
    fn overload_nests_tap_action_into_descriptor_pool() {
        let mut layers = HashMap::new();
        layers.insert("nav".to_string(), 1u16);
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "overload(nav, esc)", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::Overload);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].op, Op::KeySequence);
    }

    #[test]
    fn multi_token_text_becomes_a_macro() {
        let layers = HashMap::new();
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "C-c C-v", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::Macro);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].len(), 2);
    }

    #[test]
    fn cmd_call_registers_a_command() {
        let layers = HashMap::new();
        let mut d = Vec::new();
        let mut m = Vec::new();
        let mut c = Vec::new();
        let desc = parse_descriptor(1, "cmd(notify-send hi)", &mut ctx(&layers, &mut d, &mut m, &mut c)).unwrap();
        assert_eq!(desc.op, Op::Command);
        assert_eq!(c, vec!["notify-send hi".to_string()]);
    }
}
