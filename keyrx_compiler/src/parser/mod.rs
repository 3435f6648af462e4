pub mod core;
pub mod descriptor;
pub mod macro_grammar;
pub mod validators;

pub use core::{Parser, ParserState};
pub use validators::{key_name, parse_key_name};
