//! Mutable runtime state and the event-processing algorithm (spec §4).
//!
//! [`config`](crate::config) holds the static, compiled-once data; this
//! module holds everything that changes while the daemon runs. Submodules
//! mirror the spec's component table: [`modifier`] is the output keystate
//! and guard logic, [`cache`] the per-held-key descriptor cache, [`layer_state`]
//! the layer activation stack, [`lookup`] descriptor resolution,
//! [`pending`] the tap/hold resolver, [`chord`] the chord resolver, and
//! [`macro_exec`] the macro executor. [`dispatcher`] wires these into
//! [`Keyboard`], the type callers actually drive.

pub mod cache;
pub mod chord;
pub mod dispatcher;
pub mod layer_state;
pub mod lookup;
pub mod macro_exec;
pub mod modifier;
pub mod pending;

pub use dispatcher::{ConfigPatcher, KeyEvent, Keyboard, NullPatcher, ScrollState};
