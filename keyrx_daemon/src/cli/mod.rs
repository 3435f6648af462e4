//! CLI subcommand implementations, invoked from `main`.

pub mod common;
pub mod devices;
pub mod error;
pub mod run;
pub mod status;
