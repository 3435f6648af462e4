//! Compiles keyd-style text configurations into the binary `.krx` format
//! `keyrx_daemon` loads via `rkyv`.

use std::path::Path;

pub mod cli;
pub mod error;
pub mod parser;
pub mod serialize;

pub use cli::compile::CompileError;

/// Compiles a text configuration file to `.krx` binary format.
///
/// # Errors
///
/// Returns `CompileError` if parsing, serialization, or I/O fails.
pub fn compile_file(input: &Path, output: &Path) -> Result<(), CompileError> {
    cli::compile::handle_compile(input, output)
}
