//! `keyrx status` — query a running daemon over the IPC socket.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::DaemonError;
use crate::ipc::{DaemonIpc, IpcRequest, IpcResponse, UnixSocketIpc};

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub running: bool,
    pub uptime_secs: u64,
    pub device_count: usize,
}

pub fn status(socket_path: PathBuf) -> Result<StatusOutput, DaemonError> {
    let mut client = UnixSocketIpc::new(socket_path);
    match client.send_request(&IpcRequest::GetStatus)? {
        IpcResponse::Status { running, uptime_secs, devices } => {
            Ok(StatusOutput { running, uptime_secs, device_count: devices.len() })
        }
        IpcResponse::Error { message } => Err(DaemonError::Runtime(message)),
    }
}
