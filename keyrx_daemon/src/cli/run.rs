//! `keyrx run` — foreground daemon entry point.

use std::path::PathBuf;

use crate::daemon::Daemon;
use crate::error::DaemonError;

pub struct RunArgs {
    pub config: PathBuf,
    pub device_pattern: String,
}

pub fn run(args: RunArgs) -> Result<(), DaemonError> {
    Daemon::new(args.config).with_device_pattern(args.device_pattern).run()
}
