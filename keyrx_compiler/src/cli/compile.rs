//! `compile` subcommand: parses a keyd-style text configuration and writes
//! it out as a `.krx` binary file.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use colored::*;

use crate::error::{format_error, ParseError, SerializeError};
use crate::parser::Parser;
use crate::serialize::serialize;

#[derive(Debug)]
pub enum CompileError {
    ParseError(ParseError),
    SerializeError(SerializeError),
    IoError(io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(err) => write!(f, "{err}"),
            Self::SerializeError(err) => write!(f, "{err}"),
            Self::IoError(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        Self::ParseError(err)
    }
}

impl From<SerializeError> for CompileError {
    fn from(err: SerializeError) -> Self {
        Self::SerializeError(err)
    }
}

pub fn handle_compile(input: &Path, output: &Path) -> Result<(), CompileError> {
    let source = fs::read_to_string(input).map_err(|e| {
        CompileError::ParseError(ParseError::Io { path: input.display().to_string(), message: e.to_string() })
    })?;

    let (config, _state) = Parser::parse(&source).map_err(|e| {
        eprint!("{}", format_error(&e, &input.display().to_string(), &source));
        CompileError::ParseError(e)
    })?;

    let bytes = serialize(&config)?;
    fs::write(output, &bytes)?;

    let hash_hex = hex::encode(&bytes[8..40]);

    eprintln!("{}", "compiled successfully".green().bold());
    eprintln!("  output: {}", output.display());
    eprintln!("  size:   {} bytes", bytes.len());
    eprintln!("  sha256: {hash_hex}");

    Ok(())
}
