//! Unix socket IPC client, used by the CLI to query a running daemon.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use interprocess::local_socket::LocalSocketStream;

use super::{DaemonIpc, IpcRequest, IpcResponse, DEFAULT_TIMEOUT};
use crate::error::IpcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Disconnected,
    Connected,
}

pub struct UnixSocketIpc {
    socket_path: PathBuf,
    timeout: Duration,
    stream: Option<LocalSocketStream>,
    state: ConnectionState,
}

impl UnixSocketIpc {
    pub fn new(socket_path: PathBuf) -> Self {
        Self::with_timeout(socket_path, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(socket_path: PathBuf, timeout: Duration) -> Self {
        Self { socket_path, timeout, stream: None, state: ConnectionState::Disconnected }
    }

    fn connect(&mut self) -> Result<(), IpcError> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        if !self.socket_path.exists() {
            return Err(IpcError::SocketNotFound(self.socket_path.display().to_string()));
        }
        let name = self.socket_path.to_string_lossy();
        let stream = LocalSocketStream::connect(name.as_ref()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                IpcError::ConnectionRefused
            } else {
                IpcError::Io(e)
            }
        })?;
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }
}

impl DaemonIpc for UnixSocketIpc {
    fn send_request(&mut self, request: &IpcRequest) -> Result<IpcResponse, IpcError> {
        self.connect()?;
        let start = Instant::now();

        let stream = self.stream.as_mut().expect("connect() populates the stream on success");

        let json = serde_json::to_string(request).map_err(|e| IpcError::Encode(e.to_string()))?;
        let write_result = stream.write_all(json.as_bytes()).and_then(|_| stream.write_all(b"\n")).and_then(|_| stream.flush());
        if let Err(e) = write_result {
            self.state = ConnectionState::Disconnected;
            self.stream = None;
            return Err(IpcError::Io(e));
        }

        if start.elapsed() >= self.timeout {
            self.state = ConnectionState::Disconnected;
            self.stream = None;
            return Err(IpcError::Timeout(self.timeout));
        }

        let mut response_line = String::new();
        let stream = self.stream.as_mut().expect("checked above");
        let mut reader = BufReader::new(stream);
        if reader.read_line(&mut response_line).is_err() {
            self.state = ConnectionState::Disconnected;
            self.stream = None;
            return Err(IpcError::Timeout(self.timeout));
        }

        serde_json::from_str(&response_line).map_err(|e| IpcError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interprocess::local_socket::LocalSocketListener;
    use std::io::BufRead as _;
    use std::thread;
    use tempfile::TempDir;

    fn setup_test_socket() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        (temp_dir, socket_path)
    }

    #[test]
    fn socket_not_found_before_daemon_starts() {
        let (_temp_dir, socket_path) = setup_test_socket();
        let mut client = UnixSocketIpc::new(socket_path);
        let result = client.send_request(&IpcRequest::GetStatus);
        assert!(matches!(result, Err(IpcError::SocketNotFound(_))));
    }

    #[test]
    fn round_trips_a_status_request() {
        let (_temp_dir, socket_path) = setup_test_socket();

        let server_path = socket_path.clone();
        let server_handle = thread::spawn(move || {
            let listener = LocalSocketListener::bind(server_path.to_string_lossy().as_ref()).unwrap();
            let mut conn = listener.accept().unwrap();
            let mut reader = BufReader::new(&mut conn);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let _request: IpcRequest = serde_json::from_str(&line).unwrap();

            let response = IpcResponse::Status { running: true, uptime_secs: 100, devices: Vec::new() };
            let json = serde_json::to_string(&response).unwrap();
            conn.write_all(json.as_bytes()).unwrap();
            conn.write_all(b"\n").unwrap();
            conn.flush().unwrap();
        });

        thread::sleep(Duration::from_millis(100));

        let mut client = UnixSocketIpc::new(socket_path);
        let response = client.send_request(&IpcRequest::GetStatus).unwrap();
        match response {
            IpcResponse::Status { running, uptime_secs, .. } => {
                assert!(running);
                assert_eq!(uptime_secs, 100);
            }
            _ => panic!("expected Status response"),
        }

        server_handle.join().unwrap();
    }
}
