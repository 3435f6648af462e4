//! IPC server run by the daemon: accepts CLI connections and answers status
//! queries against a shared snapshot the event loop keeps up to date.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use interprocess::local_socket::{LocalSocketListener, LocalSocketStream};

use super::{DeviceStatus, IpcRequest, IpcResponse};

/// Daemon-side status snapshot, refreshed by the event loop and read by the
/// IPC server on each request.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub uptime_secs: u64,
    pub devices: Vec<DeviceStatus>,
}

pub struct IpcServer {
    socket_path: PathBuf,
    listener: Option<LocalSocketListener>,
}

impl IpcServer {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path, listener: None }
    }

    pub fn start(&mut self) -> std::io::Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        let listener = LocalSocketListener::bind(self.socket_path.to_string_lossy().as_ref())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        self.listener = Some(listener);
        log::info!("IPC server listening on {}", self.socket_path.display());
        Ok(())
    }

    /// Accepts connections forever, answering each with `snapshot`'s current
    /// contents. Spawns one thread per connection.
    pub fn serve_forever(&self, snapshot: Arc<Mutex<StatusSnapshot>>) -> std::io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "call start() first"))?;

        for conn in listener.incoming() {
            match conn {
                Ok(stream) => {
                    let snapshot = Arc::clone(&snapshot);
                    std::thread::spawn(move || {
                        if let Err(e) = Self::handle_client(stream, &snapshot) {
                            log::warn!("IPC client error: {e}");
                        }
                    });
                }
                Err(e) => log::warn!("failed to accept IPC connection: {e}"),
            }
        }
        Ok(())
    }

    fn handle_client(mut stream: LocalSocketStream, snapshot: &Mutex<StatusSnapshot>) -> std::io::Result<()> {
        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut stream);
            reader.read_line(&mut request_line)?;
        }

        let response = match serde_json::from_str::<IpcRequest>(request_line.trim()) {
            Ok(IpcRequest::GetStatus) => {
                let snapshot = snapshot.lock().unwrap_or_else(|p| p.into_inner());
                IpcResponse::Status {
                    running: true,
                    uptime_secs: snapshot.uptime_secs,
                    devices: snapshot.devices.clone(),
                }
            }
            Err(e) => IpcResponse::Error { message: format!("malformed request: {e}") },
        };

        let json = serde_json::to_string(&response).expect("IpcResponse always serializes");
        stream.write_all(json.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()
    }

    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_server_has_no_listener_until_started() {
        let server = IpcServer::new(PathBuf::from("/tmp/keyrx-test-ipc-server.sock"));
        assert!(server.listener.is_none());
    }
}
