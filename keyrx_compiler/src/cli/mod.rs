//! CLI subcommand handlers:
//! - `compile`: compile a keyd-style text configuration to `.krx`
//! - `hash`: extract/verify the SHA256 hash embedded in a `.krx` file
//! - `parse`: parse a text configuration and display its structure
//! - `view`: render a `.krx`/text configuration's layers and bindings

pub mod compile;
pub mod hash;
pub mod parse;
pub mod view;

pub use compile::{handle_compile, CompileError};
pub use hash::{handle_hash, HashError};
pub use parse::{handle_parse, ParseCommandError};
pub use view::{handle_view, ViewError};
