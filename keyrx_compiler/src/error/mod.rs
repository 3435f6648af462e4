pub mod display;
pub mod formatting;
pub mod types;

pub use formatting::format_error;
pub use types::{DeserializeError, ParseError, SerializeError};
