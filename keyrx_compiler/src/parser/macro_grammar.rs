//! Tokenizes a macro body into `MacroEntry` values.
//!
//! Grammar (spec's external-interfaces macro format): whitespace-separated
//! tokens; `C-`/`S-`/`A-`/`G-`/`M-` modifier prefixes (ctrl/shift/alt/altgr/
//! meta); `+`-joined bare key names held together until the next token;
//! `NNNms` delays; `cmd(...)`/`command(...)` shell dispatch; `type(...)`/
//! `txt(...)`/`t(...)` literal text; any other single character is typed via
//! the Unicode leader.

use keyrx_core::config::{Command, Macro, MacroEntry, ModMask};

use crate::error::ParseError;
use crate::parser::validators::parse_key_name;

/// Splits a macro body into raw tokens, keeping the contents of
/// `type(...)`/`txt(...)`/`t(...)`/`cmd(...)`/`command(...)` intact (they
/// may contain internal whitespace).
fn tokenize(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let mut word: String = chars[start..i].iter().collect();

        if let Some(open) = word.find('(') {
            let verb = &word[..open];
            if matches!(verb, "type" | "txt" | "t" | "cmd" | "command") {
                let mut depth = 1i32;
                let mut j = i;
                let mut closed = word.ends_with(')') && depth_at_close(&word) == 0;
                while !closed && j < chars.len() {
                    match chars[j] {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                    word.push(chars[j]);
                    j += 1;
                    if depth == 0 {
                        closed = true;
                    }
                }
                i = j;
                tokens.push(word);
                continue;
            }
        }

        tokens.push(word);
    }

    tokens
}

fn depth_at_close(word: &str) -> i32 {
    let mut depth = 0i32;
    for c in word.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Parses a `verb(...)` token's inner text, given the verb already matched
/// one of `type`/`txt`/`t`/`cmd`/`command`.
fn call_body(token: &str) -> Option<&str> {
    let open = token.find('(')?;
    let close = token.rfind(')')?;
    if close <= open {
        return None;
    }
    Some(&token[open + 1..close])
}

fn parse_mod_prefixed(line: usize, token: &str) -> Result<(u8, ModMask), ParseError> {
    let mut mods = ModMask::NONE;
    let mut rest = token;

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

    match parse_key_name(rest) {
        Some(code) => Ok((code, mods)),
        None if rest == token => Err(ParseError::UnknownKeyName { line, name: token.to_string() }),
        None => Err(ParseError::UnknownKeyName { line, name: rest.to_string() }),
    }
}

/// Parses a macro body string into a `Macro` (`Vec<MacroEntry>`), pushing
/// any `cmd()`/`command()` shell strings into `commands`.
pub fn parse_macro(line: usize, body: &str, commands: &mut Vec<Command>) -> Result<Macro, ParseError> {
    let mut entries = Vec::new();

    for token in tokenize(body) {
        if let Some(inner) = token.strip_prefix("type(").and_then(|_| call_body(&token)) {
            for ch in inner.chars() {
                entries.push(MacroEntry::Unicode(ch as u32));
            }
        } else if let Some(inner) = token.strip_prefix("txt(").and_then(|_| call_body(&token)) {
            for ch in inner.chars() {
                entries.push(MacroEntry::Unicode(ch as u32));
            }
        } else if token.starts_with("t(") {
            let inner = call_body(&token)
                .ok_or_else(|| ParseError::UnclosedCall { line, verb: "t".to_string() })?;
            for ch in inner.chars() {
                entries.push(MacroEntry::Unicode(ch as u32));
            }
        } else if token.starts_with("cmd(") || token.starts_with("command(") {
            let verb = if token.starts_with("cmd(") { "cmd" } else { "command" };
            let inner = call_body(&token)
                .ok_or_else(|| ParseError::UnclosedCall { line, verb: verb.to_string() })?;
            commands.push(inner.to_string());
            entries.push(MacroEntry::Command((commands.len() - 1) as u16));
        } else if let Some(ms_text) = token.strip_suffix("ms") {
            if !ms_text.is_empty() && ms_text.chars().all(|c| c.is_ascii_digit()) {
                let ms: u32 = ms_text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { line, text: token.clone() })?;
                entries.push(MacroEntry::Timeout(ms));
            } else {
                push_key_or_unicode(line, &token, &mut entries)?;
            }
        } else if token.contains('+') {
            let parts: Vec<&str> = token.split('+').collect();
            let mut codes = Vec::with_capacity(parts.len());
            for part in &parts {
                match parse_key_name(part) {
                    Some(code) => codes.push(code),
                    None => return Err(ParseError::UnknownKeyName { line, name: (*part).to_string() }),
                }
            }
            for code in codes {
                entries.push(MacroEntry::Hold(code));
            }
            entries.push(MacroEntry::Release);
        } else {
            push_key_or_unicode(line, &token, &mut entries)?;
        }
    }

    Ok(entries)
}

fn push_key_or_unicode(line: usize, token: &str, entries: &mut Vec<MacroEntry>) -> Result<(), ParseError> {
    if let Some(code) = parse_key_name(token) {
        entries.push(MacroEntry::KeySequence { code, mods: ModMask::NONE });
        return Ok(());
    }

    if token.contains('-') && token.len() > 2 {
        match parse_mod_prefixed(line, token) {
            Ok((code, mods)) => {
                entries.push(MacroEntry::KeySequence { code, mods });
                return Ok(());
            }
            Err(e) => {
                let mut chars = token.chars();
                if chars.clone().count() == 1 {
                    entries.push(MacroEntry::Unicode(chars.next().unwrap() as u32));
                    return Ok(());
                }
                return Err(e);
            }
        }
    }

    let mut chars = token.chars();
    if chars.clone().count() == 1 {
        entries.push(MacroEntry::Unicode(chars.next().unwrap() as u32));
        Ok(())
    } else {
        Err(ParseError::UnknownKeyName { line, name: token.to_string() })
    }
}
