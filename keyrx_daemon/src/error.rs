//! Error types for the keyrx daemon.
//!
//! Layered the way the daemon's concerns are layered: platform I/O,
//! configuration loading, IPC transport, and the top-level daemon error that
//! each of those converts into via `#[from]`.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Platform-specific operation errors (device access, uinput, evdev).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    #[error("device not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("end of event stream")]
    EndOfStream,

    #[error("event injection failed: {0}")]
    InjectionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration loading errors (the compiled `.krx` binary, not the text source).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid archived configuration: {0}")]
    Decode(String),

    #[error("no active profile is set")]
    NoActiveProfile,
}

/// IPC transport errors between the CLI and a running daemon.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IpcError {
    #[error("daemon socket not found at {0} (is the daemon running?)")]
    SocketNotFound(String),

    #[error("connection refused by daemon socket")]
    ConnectionRefused,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to decode IPC response: {0}")]
    Decode(String),

    #[error("failed to encode IPC request: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level daemon error. Module-specific errors convert into this via `From`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DaemonError {
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    #[error("failed to install signal handlers: {0}")]
    Signal(io::Error),

    #[error("runtime error: {0}")]
    Runtime(String),
}
