//! Placeholder for Linux-specific device discovery helpers.
//!
//! Enumeration itself lives in [`crate::device_manager::linux`], which also
//! owns the [`super::EvdevInput`] handles it discovers.
