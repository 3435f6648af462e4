//! Linux platform backend: evdev for capture, uinput for injection.

pub mod device_discovery;
pub mod input_capture;
pub mod keycode_map;
pub mod output_injection;

pub use input_capture::EvdevInput;
pub use output_injection::UinputOutput;
