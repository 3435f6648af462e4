#![no_std]

//! keyrx_core - the event-processing core of a keyboard remapping daemon.
//!
//! This crate is OS-agnostic: it performs no I/O, never reads a clock, and
//! has no knowledge of the device layer, virtual-output layer, or IPC
//! surface that surround it (those are the caller's concern). Callers push
//! physical key events in timestamp order into [`runtime::Keyboard`] and
//! receive calls on an [`output::OutputSink`] in return.

extern crate alloc;

pub mod config;
pub mod output;
pub mod runtime;

// Re-export the types most callers need.
pub use config::{Chord, Command, Config, Descriptor, Layer, LayerType, Macro, MacroEntry, Op};
pub use output::OutputSink;
pub use runtime::{ConfigPatcher, KeyEvent, Keyboard, NullPatcher, ScrollState};

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}
