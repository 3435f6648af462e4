//! CLI-daemon IPC over a Unix domain socket, newline-delimited JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod server;
pub mod unix_socket;

pub use crate::error::IpcError;
pub use server::IpcServer;
pub use unix_socket::UnixSocketIpc;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/keyrx-daemon.sock";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Requests the CLI can send to a running daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Daemon liveness, uptime, and per-device status.
    GetStatus,
}

/// Per-device status reported by [`IpcResponse::Status`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceStatus {
    pub device_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcResponse {
    Status { running: bool, uptime_secs: u64, devices: Vec<DeviceStatus> },
    Error { message: String },
}

/// Implemented by both the CLI (request side) and daemon (response side).
pub trait DaemonIpc {
    fn send_request(&mut self, request: &IpcRequest) -> Result<IpcResponse, IpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let req = IpcRequest::GetStatus;
        let json = serde_json::to_string(&req).unwrap();
        let back: IpcRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn status_response_round_trips_through_json() {
        let resp = IpcResponse::Status {
            running: true,
            uptime_secs: 42,
            devices: vec![DeviceStatus { device_id: "path-/dev/input/event3".into(), name: "Test KB".into() }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: IpcResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, back);
    }
}
